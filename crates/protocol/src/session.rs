//! Shared session state document.
//!
//! One JSON document at a well-known repository path records whether an RDP
//! session is active and who owns it. The bot writes the lock fields; the
//! provisioning workflow writes the connection fields once the machine is up.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lenient;

/// Session lifecycle status as stored in the state document.
///
/// Unknown values written by the workflow are preserved verbatim in
/// [`SessionStatus::Other`] and treated as "not active".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionStatus {
	#[default]
	Stopped,
	Queued,
	Running,
	Completed,
	Other(String),
}

impl SessionStatus {
	/// Returns `true` while the session lock is held.
	pub fn is_active(&self) -> bool {
		matches!(self, SessionStatus::Queued | SessionStatus::Running)
	}

	pub fn as_str(&self) -> &str {
		match self {
			SessionStatus::Stopped => "stopped",
			SessionStatus::Queued => "queued",
			SessionStatus::Running => "running",
			SessionStatus::Completed => "completed",
			SessionStatus::Other(raw) => raw.as_str(),
		}
	}
}

impl From<String> for SessionStatus {
	fn from(raw: String) -> Self {
		match raw.trim().to_ascii_lowercase().as_str() {
			"" | "stopped" => SessionStatus::Stopped,
			"queued" => SessionStatus::Queued,
			"running" => SessionStatus::Running,
			"completed" => SessionStatus::Completed,
			_ => SessionStatus::Other(raw),
		}
	}
}

impl From<SessionStatus> for String {
	fn from(status: SessionStatus) -> Self {
		status.as_str().to_string()
	}
}

impl fmt::Display for SessionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The persisted session state document.
///
/// The concurrency token (the blob sha) is not part of the JSON body; stores
/// return it next to the decoded document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDocument {
	#[serde(default, deserialize_with = "lenient::status")]
	pub status: SessionStatus,
	/// Identifier of the caller holding the lock.
	#[serde(
		default,
		rename = "owner_chat_id",
		alias = "owner_id",
		deserialize_with = "lenient::opt_id",
		skip_serializing_if = "Option::is_none"
	)]
	pub owner_id: Option<String>,
	#[serde(default, deserialize_with = "lenient::opt_epoch", skip_serializing_if = "Option::is_none")]
	pub started_at: Option<u64>,
	#[serde(default, deserialize_with = "lenient::opt_epoch", skip_serializing_if = "Option::is_none")]
	pub updated_at: Option<u64>,
	#[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
	pub endpoint: Option<String>,
	#[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	#[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
	pub password: Option<String>,
	#[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
	pub web: Option<String>,
	#[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
	pub note: Option<String>,
}

impl SessionDocument {
	/// Document written when `owner` takes the lock.
	pub fn queued(owner: impl Into<String>, now: u64) -> Self {
		Self {
			status: SessionStatus::Queued,
			owner_id: Some(owner.into()),
			started_at: Some(now),
			updated_at: Some(now),
			..Default::default()
		}
	}

	/// Document written when the lock is given back.
	pub fn stopped(owner: Option<String>, now: u64, note: Option<String>) -> Self {
		Self {
			status: SessionStatus::Stopped,
			owner_id: owner,
			updated_at: Some(now),
			note,
			..Default::default()
		}
	}

	/// Returns `true` while the session lock is held.
	pub fn is_active(&self) -> bool {
		self.status.is_active()
	}

	pub fn owner(&self) -> Option<&str> {
		self.owner_id.as_deref()
	}

	/// Returns `true` once the workflow has published connection details.
	pub fn has_connection_details(&self) -> bool {
		self.endpoint.is_some() || self.web.is_some()
	}
}
