use rdp::ErrorKind;
use serde::{Deserialize, Serialize};

/// Current schema version for command output.
pub const SCHEMA_VERSION: u32 = 1;

/// The result envelope returned by every operator command.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub schema_version: Option<u32>,
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub inputs: Option<CommandInputs>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub duration_ms: Option<u64>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub diagnostics: Vec<Diagnostic>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub config: Option<EffectiveConfig>,
}

/// Inputs used for a command execution.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommandInputs {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub caller: Option<String>,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub force: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub note: Option<String>,
}

/// Error information for failed commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
}

/// Standardized error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	StoreUnavailable,
	RaceLost,
	AlreadyActive,
	WorkflowBusy,
	NotOwner,
	CoolingDown,
	DispatchFailed,
	CompensationFailed,
	GatewayError,
	ConfigError,
	InvalidInput,
	InternalError,
}

impl From<ErrorKind> for ErrorCode {
	fn from(kind: ErrorKind) -> Self {
		match kind {
			ErrorKind::StoreUnavailable => ErrorCode::StoreUnavailable,
			ErrorKind::RaceLost => ErrorCode::RaceLost,
			ErrorKind::AlreadyActive => ErrorCode::AlreadyActive,
			ErrorKind::WorkflowBusy => ErrorCode::WorkflowBusy,
			ErrorKind::NotOwner => ErrorCode::NotOwner,
			ErrorKind::CoolingDown => ErrorCode::CoolingDown,
			ErrorKind::DispatchFailed => ErrorCode::DispatchFailed,
			ErrorKind::CompensationFailed => ErrorCode::CompensationFailed,
		}
	}
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::StoreUnavailable => write!(f, "STORE_UNAVAILABLE"),
			ErrorCode::RaceLost => write!(f, "RACE_LOST"),
			ErrorCode::AlreadyActive => write!(f, "ALREADY_ACTIVE"),
			ErrorCode::WorkflowBusy => write!(f, "WORKFLOW_BUSY"),
			ErrorCode::NotOwner => write!(f, "NOT_OWNER"),
			ErrorCode::CoolingDown => write!(f, "COOLING_DOWN"),
			ErrorCode::DispatchFailed => write!(f, "DISPATCH_FAILED"),
			ErrorCode::CompensationFailed => write!(f, "COMPENSATION_FAILED"),
			ErrorCode::GatewayError => write!(f, "GATEWAY_ERROR"),
			ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
			ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
			ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
		}
	}
}

/// Diagnostic message attached to a command result.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
	pub level: DiagnosticLevel,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source: Option<String>,
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
	Info,
	Warning,
	Error,
}

/// Where the session document lives.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
	pub repository: String,
	pub state_path: String,
	pub workflow: String,
	pub workflow_ref: String,
}
