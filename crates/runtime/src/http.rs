use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use thiserror::Error;

/// Failure constructing one of the HTTP clients.
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("{service} credential is not a valid header value")]
	InvalidCredential { service: &'static str },
	#[error("failed to build {service} HTTP client: {source}")]
	Build {
		service: &'static str,
		#[source]
		source: reqwest::Error,
	},
}

/// Longest error body excerpt carried into error messages.
const BODY_EXCERPT: usize = 300;

pub(crate) fn build_client(service: &'static str, timeout: Duration, headers: HeaderMap) -> Result<Client, ClientError> {
	Client::builder()
		.timeout(timeout)
		.default_headers(headers)
		.build()
		.map_err(|source| ClientError::Build { service, source })
}

pub(crate) fn bearer(service: &'static str, token: &str) -> Result<HeaderValue, ClientError> {
	let mut value =
		HeaderValue::from_str(&format!("Bearer {}", token.trim())).map_err(|_| ClientError::InvalidCredential { service })?;
	value.set_sensitive(true);
	Ok(value)
}

pub(crate) fn join(base: &str, path: &str) -> String {
	format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Transport failure, split into "timed out" and everything else.
pub(crate) enum Failure {
	Timeout,
	Transport(String),
}

impl From<reqwest::Error> for Failure {
	fn from(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			Failure::Timeout
		} else {
			// Bot API URLs embed the token.
			Failure::Transport(err.without_url().to_string())
		}
	}
}

/// Reads a failed response body, truncated for error messages.
pub(crate) async fn body_excerpt(response: Response) -> String {
	let body = response.text().await.unwrap_or_default();
	let trimmed = body.trim();
	match trimmed.char_indices().nth(BODY_EXCERPT) {
		Some((cut, _)) => format!("{}…", &trimmed[..cut]),
		None => trimmed.to_string(),
	}
}
