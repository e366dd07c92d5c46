//! Error taxonomy for the session lock and its remote collaborators.
//!
//! Denials ([`Denial`]) are expected business outcomes and are kept apart from
//! transport failures so callers can tell "wait" from "retry later".

use rdp_protocol::SessionStatus;
use serde::Serialize;
use thiserror::Error;

/// Failure talking to the remote state store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
	#[error("state store request timed out")]
	Timeout,
	#[error("state store transport error: {0}")]
	Transport(String),
	#[error("state store rejected the request ({status}): {message}")]
	Rejected { status: u16, message: String },
	#[error("state document is malformed: {0}")]
	Malformed(String),
}

/// Failure talking to the workflow executor.
#[derive(Debug, Clone, Error)]
pub enum ExecutorError {
	#[error("workflow request timed out")]
	Timeout,
	#[error("workflow transport error: {0}")]
	Transport(String),
	#[error("workflow request rejected ({status}): {message}")]
	Rejected { status: u16, message: String },
}

/// Failure talking to the messaging gateway.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
	#[error("gateway request timed out")]
	Timeout,
	#[error("gateway transport error: {0}")]
	Transport(String),
	#[error("gateway API error{}: {description}", .code.map(|c| format!(" {c}")).unwrap_or_default())]
	Api { code: Option<i64>, description: String },
	#[error("gateway response is malformed: {0}")]
	Malformed(String),
}

/// Failure talking to the assistant text service.
#[derive(Debug, Clone, Error)]
pub enum AssistantError {
	#[error("assistant is not configured")]
	Disabled,
	#[error("assistant request timed out")]
	Timeout,
	#[error("assistant transport error: {0}")]
	Transport(String),
	#[error("assistant API error ({status}): {message}")]
	Api { status: u16, message: String },
	#[error("assistant response is malformed: {0}")]
	Malformed(String),
}

/// Business-rule denial of a lock transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
	#[error("a session is already {status}")]
	AlreadyActive { owner: Option<String>, status: SessionStatus },
	#[error("a workflow run is still queued or in progress")]
	WorkflowBusy,
	#[error("another request took the session lock first")]
	RaceLost,
	#[error("the active session belongs to {owner}")]
	NotOwner { owner: String },
}

/// Error returned by [`LockManager`](crate::LockManager) operations.
#[derive(Debug, Clone, Error)]
pub enum LockError {
	#[error(transparent)]
	Denied(#[from] Denial),
	#[error("state store unavailable: {0}")]
	StoreUnavailable(#[from] StoreError),
	#[error("workflow status unavailable: {0}")]
	ProbeUnavailable(#[source] ExecutorError),
}

impl LockError {
	pub fn denial(&self) -> Option<&Denial> {
		match self {
			LockError::Denied(denial) => Some(denial),
			_ => None,
		}
	}
}

/// Error returned by [`SessionBroker::request`](crate::SessionBroker::request).
#[derive(Debug, Clone, Error)]
pub enum RequestError {
	#[error("requests from this caller are cooling down; retry in {retry_after}s")]
	CoolingDown { retry_after: u64 },
	#[error(transparent)]
	Lock(#[from] LockError),
	#[error("workflow dispatch failed: {0}")]
	DispatchFailed(#[source] ExecutorError),
	#[error("workflow dispatch failed ({dispatch}) and releasing the session lock also failed ({compensation})")]
	CompensationFailed { dispatch: ExecutorError, compensation: LockError },
}

/// Stable, machine-readable name for every outcome in the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	StoreUnavailable,
	RaceLost,
	AlreadyActive,
	WorkflowBusy,
	NotOwner,
	CoolingDown,
	DispatchFailed,
	CompensationFailed,
}

impl ErrorKind {
	pub fn as_str(self) -> &'static str {
		match self {
			ErrorKind::StoreUnavailable => "store_unavailable",
			ErrorKind::RaceLost => "race_lost",
			ErrorKind::AlreadyActive => "already_active",
			ErrorKind::WorkflowBusy => "workflow_busy",
			ErrorKind::NotOwner => "not_owner",
			ErrorKind::CoolingDown => "cooling_down",
			ErrorKind::DispatchFailed => "dispatch_failed",
			ErrorKind::CompensationFailed => "compensation_failed",
		}
	}
}

impl std::fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Denial {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Denial::AlreadyActive { .. } => ErrorKind::AlreadyActive,
			Denial::WorkflowBusy => ErrorKind::WorkflowBusy,
			Denial::RaceLost => ErrorKind::RaceLost,
			Denial::NotOwner { .. } => ErrorKind::NotOwner,
		}
	}
}

impl LockError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			LockError::Denied(denial) => denial.kind(),
			LockError::StoreUnavailable(_) | LockError::ProbeUnavailable(_) => ErrorKind::StoreUnavailable,
		}
	}
}

impl RequestError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			RequestError::CoolingDown { .. } => ErrorKind::CoolingDown,
			RequestError::Lock(err) => err.kind(),
			RequestError::DispatchFailed(_) => ErrorKind::DispatchFailed,
			RequestError::CompensationFailed { .. } => ErrorKind::CompensationFailed,
		}
	}
}
