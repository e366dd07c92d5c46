//! GitHub REST adapters.

mod actions;
mod contents;

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};

pub use actions::ActionsExecutor;
pub use contents::ContentsStore;
use rdp_protocol::github::ApiErrorBody;

use crate::http::{self, ClientError};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const SERVICE: &str = "GitHub";

/// Authenticated client scoped to one `owner/repo`.
#[derive(Debug, Clone)]
pub struct GithubClient {
	http: Client,
	api_url: String,
	repo: String,
}

impl GithubClient {
	pub fn new(token: &str, repo: &str, api_url: &str, timeout: Duration) -> Result<Self, ClientError> {
		let mut headers = HeaderMap::new();
		headers.insert(AUTHORIZATION, http::bearer(SERVICE, token)?);
		headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
		headers.insert("X-GitHub-Api-Version", HeaderValue::from_static("2022-11-28"));
		headers.insert(USER_AGENT, HeaderValue::from_static("rdp-telegram-bot"));

		Ok(Self {
			http: http::build_client(SERVICE, timeout, headers)?,
			api_url: api_url.to_string(),
			repo: repo.trim_matches('/').to_string(),
		})
	}

	pub fn repo(&self) -> &str {
		&self.repo
	}

	/// `{api}/repos/{repo}/{path}`.
	fn repo_url(&self, path: &str) -> String {
		http::join(&self.api_url, &format!("repos/{}/{}", self.repo, path.trim_start_matches('/')))
	}
}

/// Best-effort `message` from a failed response.
async fn error_message(response: Response) -> String {
	let excerpt = http::body_excerpt(response).await;
	match serde_json::from_str::<ApiErrorBody>(&excerpt) {
		Ok(body) if !body.message.is_empty() => body.message,
		_ => excerpt,
	}
}
