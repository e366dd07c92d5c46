//! GitHub REST payloads used by the state store and the workflow executor.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// `GET /repos/{repo}/contents/{path}` response subset for a file.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentsFile {
	pub sha: String,
	#[serde(default)]
	pub content: String,
	#[serde(default)]
	pub encoding: Option<String>,
}

impl ContentsFile {
	/// Decodes the base64 body. GitHub wraps the encoded content at 60 columns.
	pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
		let compact: String = self.content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
		STANDARD.decode(compact)
	}
}

/// `PUT /repos/{repo}/contents/{path}` request body.
#[derive(Debug, Clone, Serialize)]
pub struct PutContentsRequest {
	pub message: String,
	pub content: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sha: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub branch: Option<String>,
}

impl PutContentsRequest {
	/// Builds a request that base64-encodes `body`.
	pub fn new(message: impl Into<String>, body: &[u8], sha: Option<String>) -> Self {
		Self {
			message: message.into(),
			content: STANDARD.encode(body),
			sha,
			branch: None,
		}
	}
}

/// `PUT /repos/{repo}/contents/{path}` response subset.
#[derive(Debug, Clone, Deserialize)]
pub struct PutContentsResponse {
	#[serde(default)]
	pub content: Option<ContentRef>,
}

/// Reference to the blob written by a contents update.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentRef {
	pub sha: String,
	#[serde(default)]
	pub path: Option<String>,
}

/// `POST /repos/{repo}/actions/workflows/{file}/dispatches` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowDispatchRequest {
	#[serde(rename = "ref")]
	pub git_ref: String,
	pub inputs: BTreeMap<String, String>,
}

/// `GET /repos/{repo}/actions/workflows/{file}/runs` response subset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowRunList {
	#[serde(default)]
	pub total_count: u64,
	#[serde(default)]
	pub workflow_runs: Vec<WorkflowRun>,
}

impl WorkflowRunList {
	/// Returns `true` when any listed run has not finished yet.
	pub fn has_pending(&self) -> bool {
		self.workflow_runs.iter().any(WorkflowRun::is_pending)
	}
}

/// A single workflow run.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
	pub id: u64,
	#[serde(default)]
	pub status: Option<String>,
	#[serde(default)]
	pub conclusion: Option<String>,
	#[serde(default)]
	pub html_url: Option<String>,
}

impl WorkflowRun {
	/// Queued, waiting and in-progress runs all count as busy.
	pub fn is_pending(&self) -> bool {
		matches!(
			self.status.as_deref(),
			Some("queued" | "in_progress" | "waiting" | "requested" | "pending")
		)
	}
}

/// Error body returned by the REST API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
	#[serde(default)]
	pub message: String,
	#[serde(default)]
	pub documentation_url: Option<String>,
}
