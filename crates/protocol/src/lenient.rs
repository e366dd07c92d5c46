//! Tolerant field decoders for documents written by other tools.
//!
//! The state document is shared with a workflow that writes it from shell
//! scripts, so identifiers and timestamps show up as either strings or numbers.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::session::SessionStatus;

/// Decodes a string or integer identifier; empty strings and `null` become `None`.
pub(crate) fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<Value>::deserialize(deserializer)?;
	Ok(match value {
		Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
		Some(Value::Number(n)) => Some(n.to_string()),
		_ => None,
	})
}

/// Decodes a session status; `null` is free and other non-string values are
/// kept as [`SessionStatus::Other`].
pub(crate) fn status<'de, D>(deserializer: D) -> Result<SessionStatus, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Value::deserialize(deserializer)?;
	Ok(match value {
		Value::Null => SessionStatus::Stopped,
		Value::String(s) => SessionStatus::from(s),
		other => SessionStatus::Other(other.to_string()),
	})
}

/// Decodes an epoch-seconds timestamp from an integer, float or numeric string.
pub(crate) fn opt_epoch<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<Value>::deserialize(deserializer)?;
	Ok(match value {
		Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
		Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
		_ => None,
	})
}

/// Decodes an optional display string, dropping blanks.
pub(crate) fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<Value>::deserialize(deserializer)?;
	Ok(match value {
		Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
		Some(Value::Number(n)) => Some(n.to_string()),
		_ => None,
	})
}
