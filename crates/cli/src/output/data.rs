use rdp::{Released, SessionDocument};
use serde::{Deserialize, Serialize};

/// Result data for the `status` command.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusData {
	pub status: String,
	pub active: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub owner: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub started_at: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub updated_at: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub endpoint: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub web: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub note: Option<String>,
}

impl From<&SessionDocument> for StatusData {
	/// Credentials are left out of operator output.
	fn from(doc: &SessionDocument) -> Self {
		Self {
			status: doc.status.to_string(),
			active: doc.is_active(),
			owner: doc.owner_id.clone(),
			started_at: doc.started_at,
			updated_at: doc.updated_at,
			endpoint: doc.endpoint.clone(),
			web: doc.web.clone(),
			note: doc.note.clone(),
		}
	}
}

/// Result data for the `reset` command.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetData {
	pub previous_status: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub owner: Option<String>,
	pub version: String,
	pub forced: bool,
}

impl ResetData {
	pub fn new(released: &Released, forced: bool) -> Self {
		Self {
			previous_status: released.previous.to_string(),
			owner: released.owner.clone(),
			version: released.version.to_string(),
			forced,
		}
	}
}
