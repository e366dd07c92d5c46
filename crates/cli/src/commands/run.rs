use tracing::{info, warn};

use crate::app;
use crate::bot::Bot;
use crate::config::Config;
use crate::error::Result;

/// Runs the polling loop until Ctrl-C.
pub async fn run(config: &Config) -> Result<()> {
	let (handler, gateway) = app::handler(config)?;
	info!(
		target = "rdp.bot",
		repository = %config.repository,
		workflow = %config.workflow_file,
		cooldown_secs = config.cooldown_secs,
		admins = config.admins.len(),
		"bot starting"
	);

	let stats = Bot::new(handler, gateway)
		.run_until(async {
			if let Err(err) = tokio::signal::ctrl_c().await {
				warn!(target = "rdp.bot", error = %err, "cannot listen for Ctrl-C; stopping");
			}
		})
		.await;

	info!(
		target = "rdp.bot",
		handled = stats.handled,
		poll_errors = stats.poll_errors,
		handler_errors = stats.handler_errors,
		"bot stopped"
	);
	Ok(())
}
