//! Fire-and-forget workflow dispatch and the compensation around it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::error::{ExecutorError, RequestError};
use crate::lock::{Lease, LockManager};

/// String key/value inputs passed to the provisioning job.
pub type JobInputs = BTreeMap<String, String>;

/// Note recorded on the document when a reservation is rolled back.
pub const COMPENSATION_NOTE: &str = "dispatch failed";

/// Workflow coordinates shared by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTarget {
	/// Workflow file name, e.g. `WindowsRDP.yml`.
	pub workflow: String,
	/// Git ref the workflow runs on.
	pub git_ref: String,
}

impl DispatchTarget {
	pub fn new(workflow: impl Into<String>, git_ref: impl Into<String>) -> Self {
		Self {
			workflow: workflow.into(),
			git_ref: git_ref.into(),
		}
	}

	pub fn job(&self, inputs: JobInputs) -> JobRequest {
		JobRequest {
			workflow: self.workflow.clone(),
			git_ref: self.git_ref.clone(),
			inputs,
		}
	}
}

/// One job submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
	pub workflow: String,
	pub git_ref: String,
	pub inputs: JobInputs,
}

/// Submits jobs; success means "accepted", not "completed".
#[async_trait]
pub trait JobExecutor: Send + Sync {
	async fn dispatch(&self, job: &JobRequest) -> Result<(), ExecutorError>;
}

/// Reports whether the executor already has a job in flight.
#[async_trait]
pub trait RunProbe: Send + Sync {
	async fn has_active_run(&self) -> Result<bool, ExecutorError>;
}

/// Accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
	pub lease: Lease,
	pub job: JobRequest,
}

/// A held lock that has not yet been paired with a dispatched job.
///
/// [`Reservation::commit`] either hands the job to the executor or gives the
/// lock back. Dropping a reservation without committing leaves the document
/// `queued`.
#[must_use = "a reservation leaves the session queued until committed"]
pub struct Reservation<'a> {
	lock: &'a LockManager,
	lease: Lease,
}

impl<'a> Reservation<'a> {
	pub(crate) fn new(lock: &'a LockManager, lease: Lease) -> Self {
		Self { lock, lease }
	}

	pub fn lease(&self) -> &Lease {
		&self.lease
	}

	/// Dispatches `job`; on failure, gives the lease back.
	///
	/// A failed dispatch is not retried. The rollback only applies while the
	/// document is still the one this lease wrote; a reset or a newer
	/// acquisition in between is left alone. When the rollback write itself
	/// fails the lock stays `queued` and [`RequestError::CompensationFailed`]
	/// carries both causes.
	pub async fn commit(self, executor: &dyn JobExecutor, job: JobRequest) -> Result<Submitted, RequestError> {
		let owner = self.lease.owner.as_str();
		match executor.dispatch(&job).await {
			Ok(()) => {
				info!(target = "rdp.dispatch", owner, workflow = %job.workflow, git_ref = %job.git_ref, "workflow dispatched");
				Ok(Submitted { lease: self.lease, job })
			}
			Err(dispatch) => {
				warn!(target = "rdp.dispatch", owner, error = %dispatch, "workflow dispatch failed; releasing session lock");
				match self.lock.rollback(&self.lease, COMPENSATION_NOTE).await {
					Ok(_) => Err(RequestError::DispatchFailed(dispatch)),
					Err(compensation) => {
						error!(
							target = "rdp.dispatch",
							owner,
							dispatch = %dispatch,
							compensation = %compensation,
							"session lock stranded in queued state"
						);
						Err(RequestError::CompensationFailed { dispatch, compensation })
					}
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use rdp_protocol::{SessionDocument, SessionStatus};

	use super::*;
	use crate::clock::ManualClock;
	use crate::error::ErrorKind;
	use crate::fakes::FakeExecutor;
	use crate::lock::ReleaseMode;
	use crate::store::MemoryStore;

	fn target() -> DispatchTarget {
		DispatchTarget::new("WindowsRDP.yml", "main")
	}

	fn inputs(chat: &str) -> JobInputs {
		JobInputs::from([("chat_id".to_string(), chat.to_string())])
	}

	#[tokio::test]
	async fn successful_commit_keeps_lock_and_records_job() {
		let store = Arc::new(MemoryStore::new());
		let lock = LockManager::new(store.clone(), Arc::new(ManualClock::new(5)));
		let executor = FakeExecutor::new();

		let reservation = lock.reserve("u1").await.unwrap();
		let submitted = reservation.commit(&executor, target().job(inputs("u1"))).await.unwrap();

		assert_eq!(submitted.lease.owner, "u1");
		assert_eq!(executor.jobs(), vec![target().job(inputs("u1"))]);
		assert_eq!(store.snapshot().unwrap().value.status, SessionStatus::Queued);
	}

	#[tokio::test]
	async fn failed_dispatch_releases_the_lock() {
		let store = Arc::new(MemoryStore::new());
		let lock = LockManager::new(store.clone(), Arc::new(ManualClock::new(5)));
		let executor = FakeExecutor::new();
		executor.fail_dispatch(true);

		let err = lock
			.reserve("u1")
			.await
			.unwrap()
			.commit(&executor, target().job(inputs("u1")))
			.await
			.unwrap_err();

		assert_eq!(err.kind(), ErrorKind::DispatchFailed);
		let doc = store.snapshot().unwrap().value;
		assert_eq!(doc.status, SessionStatus::Stopped);
		assert_eq!(doc.owner(), Some("u1"));
		assert_eq!(doc.note.as_deref(), Some(COMPENSATION_NOTE));
	}

	#[tokio::test]
	async fn rollback_leaves_a_newer_session_alone() {
		let store = Arc::new(MemoryStore::new());
		let lock = LockManager::new(store.clone(), Arc::new(ManualClock::new(5)));
		let executor = FakeExecutor::new();
		executor.fail_dispatch(true);

		let reservation = lock.reserve("u1").await.unwrap();
		// An admin reset and a new acquisition land while dispatch is in flight.
		lock.release("admin", ReleaseMode::Forced, Some("reset by telegram")).await.unwrap();
		lock.acquire("u2").await.unwrap();
		let writes = store.write_count();

		let err = reservation.commit(&executor, target().job(inputs("u1"))).await.unwrap_err();

		assert_eq!(err.kind(), ErrorKind::DispatchFailed);
		assert_eq!(store.write_count(), writes);
		assert_eq!(store.snapshot().unwrap().value, SessionDocument::queued("u2", 5));
	}

	#[tokio::test]
	async fn failed_compensation_strands_queued_state() {
		let store = Arc::new(MemoryStore::new());
		let lock = LockManager::new(store.clone(), Arc::new(ManualClock::new(5)));
		let executor = FakeExecutor::new();
		executor.fail_dispatch(true);

		let reservation = lock.reserve("u1").await.unwrap();
		store.set_offline(true);
		let err = reservation.commit(&executor, target().job(inputs("u1"))).await.unwrap_err();

		assert_eq!(err.kind(), ErrorKind::CompensationFailed);
		store.set_offline(false);
		assert_eq!(store.snapshot().unwrap().value, SessionDocument::queued("u1", 5));
	}
}
