use rdp::{GatewayError, LockError, RequestError};
use rdp_runtime::ClientError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::output::ErrorCode;

#[derive(Debug, Error)]
pub enum BotError {
	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Client(#[from] ClientError),
	#[error(transparent)]
	Gateway(#[from] GatewayError),
	#[error(transparent)]
	Lock(#[from] LockError),
	#[error(transparent)]
	Request(#[from] RequestError),
	#[error("{0}")]
	InvalidInput(String),
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl BotError {
	/// Machine-readable code for the operator result envelope.
	pub fn code(&self) -> ErrorCode {
		match self {
			BotError::Config(_) | BotError::Client(_) => ErrorCode::ConfigError,
			BotError::InvalidInput(_) => ErrorCode::InvalidInput,
			BotError::Gateway(_) => ErrorCode::GatewayError,
			BotError::Lock(err) => ErrorCode::from(err.kind()),
			BotError::Request(err) => ErrorCode::from(err.kind()),
			BotError::Other(_) => ErrorCode::InternalError,
		}
	}
}

pub type Result<T> = std::result::Result<T, BotError>;
