use async_trait::async_trait;
use rdp::{SessionDocument, StoreError, Version, Versioned, VersionedStore, WriteOutcome};
use rdp_protocol::github::{ContentsFile, PutContentsRequest, PutContentsResponse};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::{GithubClient, error_message};
use crate::http::Failure;

/// Session document stored as a JSON file through the contents API.
///
/// The blob sha is the version token. A `PUT` with a stale sha is answered
/// with `409`; a create without a sha over an existing file with `422`. Both
/// are reported as [`WriteOutcome::Conflict`].
#[derive(Debug, Clone)]
pub struct ContentsStore {
	github: GithubClient,
	path: String,
	branch: Option<String>,
}

impl ContentsStore {
	pub fn new(github: GithubClient, path: impl Into<String>) -> Self {
		Self {
			github,
			path: path.into(),
			branch: None,
		}
	}

	/// Reads and writes on `branch` instead of the default branch.
	pub fn on_branch(mut self, branch: impl Into<String>) -> Self {
		self.branch = Some(branch.into());
		self
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	fn url(&self) -> String {
		self.github.repo_url(&format!("contents/{}", self.path.trim_start_matches('/')))
	}
}

fn transport(err: reqwest::Error) -> StoreError {
	match Failure::from(err) {
		Failure::Timeout => StoreError::Timeout,
		Failure::Transport(message) => StoreError::Transport(message),
	}
}

#[async_trait]
impl VersionedStore<SessionDocument> for ContentsStore {
	async fn read(&self) -> Result<Option<Versioned<SessionDocument>>, StoreError> {
		let mut request = self.github.http.get(self.url());
		if let Some(branch) = &self.branch {
			request = request.query(&[("ref", branch)]);
		}
		let response = request.send().await.map_err(transport)?;

		let status = response.status();
		if status == StatusCode::NOT_FOUND {
			debug!(target = "rdp.store", path = %self.path, "state document absent");
			return Ok(None);
		}
		if !status.is_success() {
			return Err(StoreError::Rejected {
				status: status.as_u16(),
				message: error_message(response).await,
			});
		}

		let file: ContentsFile = response
			.json()
			.await
			.map_err(|err| StoreError::Malformed(err.without_url().to_string()))?;
		let bytes = file
			.decode()
			.map_err(|err| StoreError::Malformed(format!("content is not valid base64: {err}")))?;

		let value = if bytes.iter().all(u8::is_ascii_whitespace) {
			SessionDocument::default()
		} else {
			serde_json::from_slice(&bytes).map_err(|err| StoreError::Malformed(err.to_string()))?
		};
		debug!(target = "rdp.store", path = %self.path, sha = %file.sha, status = %value.status, "state document read");
		Ok(Some(Versioned {
			value,
			version: Version::new(file.sha),
		}))
	}

	async fn write(
		&self,
		value: &SessionDocument,
		expected: Option<&Version>,
		message: &str,
	) -> Result<WriteOutcome, StoreError> {
		let mut body = serde_json::to_vec_pretty(value).map_err(|err| StoreError::Malformed(err.to_string()))?;
		body.push(b'\n');

		let mut put = PutContentsRequest::new(message, &body, expected.map(|v| v.as_str().to_string()));
		put.branch = self.branch.clone();

		let response = self.github.http.put(self.url()).json(&put).send().await.map_err(transport)?;
		let status = response.status();

		if status.is_success() {
			let reply: PutContentsResponse = response
				.json()
				.await
				.map_err(|err| StoreError::Malformed(err.without_url().to_string()))?;
			let sha = reply
				.content
				.map(|content| content.sha)
				.ok_or_else(|| StoreError::Malformed("contents response has no blob sha".to_string()))?;
			return Ok(WriteOutcome::Committed(Version::new(sha)));
		}

		if status == StatusCode::CONFLICT || (status == StatusCode::UNPROCESSABLE_ENTITY && expected.is_none()) {
			let detail = error_message(response).await;
			warn!(target = "rdp.store", path = %self.path, status = status.as_u16(), %detail, "conditional write rejected");
			return Ok(WriteOutcome::Conflict);
		}

		Err(StoreError::Rejected {
			status: status.as_u16(),
			message: error_message(response).await,
		})
	}
}
