use rdp::SessionBroker;
use tracing::info;

use crate::error::{BotError, Result};
use crate::output::ResetData;

/// Note recorded by a forced reset when none is given.
pub const OPERATOR_RESET_NOTE: &str = "reset by operator";

/// Owner-gated reset as `caller`, or an administrative one with `force`.
pub async fn execute(broker: &SessionBroker, caller: &str, force: bool, note: Option<&str>) -> Result<ResetData> {
	let caller = caller.trim();
	if caller.is_empty() {
		return Err(BotError::InvalidInput("--caller must not be empty".to_string()));
	}

	let released = if force {
		broker.force_reset(caller, Some(note.unwrap_or(OPERATOR_RESET_NOTE))).await?
	} else {
		broker.reset(caller).await?
	};
	info!(target = "rdp.bot", caller, force, previous = %released.previous, "session reset by operator");
	Ok(ResetData::new(&released, force))
}
