pub mod reset;
mod run;
pub mod status;

use std::sync::Arc;

use rdp::SystemClock;
use serde::Serialize;

use crate::app;
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::error::Result;
use crate::output::{CommandInputs, OutputFormat, ResultBuilder, print_result};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let config = Config::from_env()?;

	match cli.command {
		Commands::Run => run::run(&config).await,
		Commands::Status => {
			let broker = app::broker(&config, Arc::new(SystemClock))?;
			let outcome = status::execute(&broker).await;
			let mut builder = ResultBuilder::new("status").config(app::effective_config(&config));
			if let Ok(data) = &outcome {
				builder = status::diagnose(builder, data);
			}
			emit(builder, outcome, cli.format)
		}
		Commands::Reset { caller, force, note } => {
			let broker = app::broker(&config, Arc::new(SystemClock))?;
			let outcome = reset::execute(&broker, &caller, force, note.as_deref()).await;
			let inputs = CommandInputs {
				caller: Some(caller),
				force,
				note,
			};
			emit(ResultBuilder::new("reset").inputs(inputs), outcome, cli.format)
		}
	}
}

/// Prints the envelope for `outcome`; a failure is printed and then returned.
fn emit<T: Serialize>(builder: ResultBuilder<T>, outcome: Result<T>, format: OutputFormat) -> Result<()> {
	match outcome {
		Ok(data) => {
			print_result(&builder.data(data).build(), format);
			Ok(())
		}
		Err(err) => {
			print_result(&builder.error(err.code(), err.to_string()).build(), format);
			Err(err)
		}
	}
}
