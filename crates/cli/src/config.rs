//! Environment-driven configuration.

use std::collections::BTreeSet;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_WORKFLOW_FILE: &str = "WindowsRDP.yml";
pub const DEFAULT_WORKFLOW_REF: &str = "main";
pub const DEFAULT_STATE_PATH: &str = "rdp_state.json";
pub const DEFAULT_COOLDOWN_SECONDS: u64 = 60;
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_LANG: &str = "Tiếng Việt";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
	#[error("{0} is not set")]
	Missing(&'static str),
	#[error("{name} is invalid: {reason}")]
	Invalid { name: &'static str, reason: String },
}

/// Assistant settings; present only when an API key is configured.
#[derive(Clone, PartialEq, Eq)]
pub struct AssistantConfig {
	pub api_key: String,
	pub model: String,
	pub api_url: String,
}

impl std::fmt::Debug for AssistantConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AssistantConfig")
			.field("model", &self.model)
			.field("api_url", &self.api_url)
			.finish_non_exhaustive()
	}
}

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
	/// Needed only by the polling loop; see [`Config::telegram_token`].
	pub telegram_token: Option<String>,
	pub github_token: String,
	/// `owner/repo`.
	pub repository: String,
	pub workflow_file: String,
	pub workflow_ref: String,
	pub state_path: String,
	pub cooldown_secs: u64,
	pub http_timeout: Duration,
	pub default_language: String,
	pub assistant: Option<AssistantConfig>,
	/// Chat ids allowed to reset a session they do not own.
	pub admins: BTreeSet<i64>,
	pub github_api_url: String,
	pub telegram_api_url: String,
}

impl std::fmt::Debug for Config {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Config")
			.field("repository", &self.repository)
			.field("workflow_file", &self.workflow_file)
			.field("workflow_ref", &self.workflow_ref)
			.field("state_path", &self.state_path)
			.field("cooldown_secs", &self.cooldown_secs)
			.field("http_timeout", &self.http_timeout)
			.field("default_language", &self.default_language)
			.field("assistant", &self.assistant)
			.field("admins", &self.admins)
			.finish_non_exhaustive()
	}
}

impl Config {
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Builds the configuration from `lookup`; blank values count as unset.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
		let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));
		let or = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

		let repository = required("GITHUB_REPOSITORY")?;
		match repository.split_once('/') {
			Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {}
			_ => {
				return Err(ConfigError::Invalid {
					name: "GITHUB_REPOSITORY",
					reason: format!("expected owner/repo, got {repository:?}"),
				});
			}
		}

		let assistant = get("OPENAI_API_KEY").map(|api_key| AssistantConfig {
			api_key,
			model: or("OPENAI_MODEL", rdp_runtime::openai::DEFAULT_MODEL),
			api_url: or("OPENAI_API_URL", rdp_runtime::openai::DEFAULT_API_URL),
		});

		let http_timeout_secs = parse_secs("HTTP_TIMEOUT_SECONDS", get("HTTP_TIMEOUT_SECONDS"), DEFAULT_HTTP_TIMEOUT_SECONDS)?;
		if http_timeout_secs == 0 {
			return Err(ConfigError::Invalid {
				name: "HTTP_TIMEOUT_SECONDS",
				reason: "must be greater than zero".to_string(),
			});
		}

		Ok(Self {
			telegram_token: get("TELEGRAM_BOT_TOKEN"),
			github_token: required("GH_PAT")?,
			repository,
			workflow_file: or("WORKFLOW_FILE", DEFAULT_WORKFLOW_FILE),
			workflow_ref: or("WORKFLOW_REF", DEFAULT_WORKFLOW_REF),
			state_path: or("STATE_PATH", DEFAULT_STATE_PATH),
			cooldown_secs: parse_secs("COOLDOWN_SECONDS", get("COOLDOWN_SECONDS"), DEFAULT_COOLDOWN_SECONDS)?,
			http_timeout: Duration::from_secs(http_timeout_secs),
			default_language: or("DEFAULT_LANG", DEFAULT_LANG),
			assistant,
			admins: parse_admins(get("ADMIN_CHAT_IDS").as_deref())?,
			github_api_url: or("GITHUB_API_URL", rdp_runtime::github::DEFAULT_API_URL),
			telegram_api_url: or("TELEGRAM_API_URL", rdp_runtime::telegram::DEFAULT_API_URL),
		})
	}

	/// Bot API token; the operator commands run without one.
	pub fn telegram_token(&self) -> Result<&str, ConfigError> {
		self.telegram_token.as_deref().ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))
	}

	pub fn is_admin(&self, chat_id: i64) -> bool {
		self.admins.contains(&chat_id)
	}
}

fn parse_secs(name: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
	match raw {
		None => Ok(default),
		Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
			name,
			reason: format!("expected a whole number of seconds, got {raw:?}"),
		}),
	}
}

fn parse_admins(raw: Option<&str>) -> Result<BTreeSet<i64>, ConfigError> {
	raw.unwrap_or_default()
		.split(',')
		.map(str::trim)
		.filter(|id| !id.is_empty())
		.map(|id| {
			id.parse().map_err(|_| ConfigError::Invalid {
				name: "ADMIN_CHAT_IDS",
				reason: format!("{id:?} is not a chat id"),
			})
		})
		.collect()
}
