use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "rdp-bot")]
#[command(about = "Telegram bot that requests Windows RDP sessions through GitHub Actions")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format for operator commands
	#[arg(short, long, global = true, value_enum, default_value = "toon")]
	pub format: OutputFormat,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
	/// Run the bot's long-polling loop until Ctrl-C
	Run,

	/// Print the shared session state
	#[command(alias = "st")]
	Status,

	/// Stop the shared session
	Reset {
		/// Chat id the reset is performed as
		#[arg(long)]
		caller: String,

		/// Skip the ownership check
		#[arg(long)]
		force: bool,

		/// Note recorded on the stopped document (with --force)
		#[arg(long, requires = "force")]
		note: Option<String>,
	},
}
