//! Read-modify-write lock over the shared session document.

use std::sync::Arc;

use rdp_protocol::{SessionDocument, SessionStatus};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::dispatch::{Reservation, RunProbe};
use crate::error::{Denial, LockError};
use crate::store::{Version, Versioned, VersionedStore, WriteOutcome};

/// Proof that this process moved the document into `queued`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
	pub owner: String,
	/// Version token of the `queued` document this process wrote.
	pub version: Version,
	pub started_at: u64,
}

/// Result of a successful release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Released {
	/// Owner recorded on the `stopped` document.
	pub owner: Option<String>,
	/// Status observed right before the release.
	pub previous: SessionStatus,
	pub version: Version,
}

/// Whether a release is gated on ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMode {
	/// Deny when someone else holds an active session.
	OwnerOnly,
	/// Administrative override.
	Forced,
}

/// Acquire/release/inspect over a [`VersionedStore`] of [`SessionDocument`].
///
/// Every operation is one read followed by at most one conditional write.
/// Remote failures surface as [`LockError::StoreUnavailable`] and are never
/// retried here.
pub struct LockManager {
	store: Arc<dyn VersionedStore<SessionDocument>>,
	probe: Option<Arc<dyn RunProbe>>,
	clock: Arc<dyn Clock>,
}

impl LockManager {
	pub fn new(store: Arc<dyn VersionedStore<SessionDocument>>, clock: Arc<dyn Clock>) -> Self {
		Self { store, probe: None, clock }
	}

	/// Adds a workflow run-status check between the document check and the write.
	pub fn with_probe(mut self, probe: Arc<dyn RunProbe>) -> Self {
		self.probe = Some(probe);
		self
	}

	/// Reads the current document; `None` when it has never been written.
	pub async fn inspect(&self) -> Result<Option<Versioned<SessionDocument>>, LockError> {
		Ok(self.store.read().await?)
	}

	/// Moves the document from free to `queued` with `caller` as owner.
	pub async fn acquire(&self, caller: &str) -> Result<Lease, LockError> {
		let (current, expected) = split(self.store.read().await?);

		if current.is_active() {
			debug!(
				target = "rdp.lock",
				caller,
				owner = current.owner().unwrap_or("-"),
				status = %current.status,
				"session already active"
			);
			return Err(Denial::AlreadyActive {
				owner: current.owner_id,
				status: current.status,
			}
			.into());
		}

		if let Some(probe) = &self.probe {
			if probe.has_active_run().await.map_err(LockError::ProbeUnavailable)? {
				debug!(target = "rdp.lock", caller, "document is free but a workflow run is pending");
				return Err(Denial::WorkflowBusy.into());
			}
		}

		let now = self.clock.now();
		let next = SessionDocument::queued(caller, now);
		match self.store.write(&next, expected.as_ref(), "Queue RDP session").await? {
			WriteOutcome::Committed(version) => {
				info!(target = "rdp.lock", owner = caller, %version, "session lock acquired");
				Ok(Lease {
					owner: caller.to_string(),
					version,
					started_at: now,
				})
			}
			WriteOutcome::Conflict => {
				warn!(
					target = "rdp.lock",
					caller,
					expected = expected.as_ref().map(Version::as_str).unwrap_or("<absent>"),
					"lost acquisition race"
				);
				Err(Denial::RaceLost.into())
			}
		}
	}

	/// Acquires the lock and returns it as a reservation awaiting dispatch.
	pub async fn reserve(&self, caller: &str) -> Result<Reservation<'_>, LockError> {
		let lease = self.acquire(caller).await?;
		Ok(Reservation::new(self, lease))
	}

	/// Moves the document to `stopped`.
	///
	/// With [`ReleaseMode::OwnerOnly`], an active session owned by someone
	/// other than `caller` is left untouched. The written owner is the
	/// previous owner, or `caller` when none was recorded.
	pub async fn release(&self, caller: &str, mode: ReleaseMode, note: Option<&str>) -> Result<Released, LockError> {
		let (current, expected) = split(self.store.read().await?);

		if mode == ReleaseMode::OwnerOnly && current.is_active() {
			if let Some(owner) = current.owner().filter(|owner| *owner != caller) {
				debug!(target = "rdp.lock", caller, owner, "release denied: not owner");
				return Err(Denial::NotOwner { owner: owner.to_string() }.into());
			}
		}

		let owner = current.owner_id.clone().or_else(|| Some(caller.to_string()));
		let next = SessionDocument::stopped(owner.clone(), self.clock.now(), note.map(str::to_string));
		let message = match (mode, note) {
			(ReleaseMode::Forced, Some(note)) => format!("Stop RDP state ({note})"),
			_ => "Reset RDP state".to_string(),
		};

		match self.store.write(&next, expected.as_ref(), &message).await? {
			WriteOutcome::Committed(version) => {
				info!(
					target = "rdp.lock",
					caller,
					forced = mode == ReleaseMode::Forced,
					previous = %current.status,
					%version,
					"session lock released"
				);
				Ok(Released {
					owner,
					previous: current.status,
					version,
				})
			}
			WriteOutcome::Conflict => {
				warn!(target = "rdp.lock", caller, "release lost a concurrent update");
				Err(Denial::RaceLost.into())
			}
		}
	}

	/// Gives back a lease this process still holds.
	///
	/// The write is conditioned on the lease's own version, so a document
	/// that moved on since the lease was taken is left as it is and
	/// `Ok(None)` is returned.
	pub(crate) async fn rollback(&self, lease: &Lease, note: &str) -> Result<Option<Released>, LockError> {
		let owner = Some(lease.owner.clone());
		let next = SessionDocument::stopped(owner.clone(), self.clock.now(), Some(note.to_string()));
		let message = format!("Stop RDP state ({note})");

		match self.store.write(&next, Some(&lease.version), &message).await? {
			WriteOutcome::Committed(version) => {
				info!(target = "rdp.lock", owner = %lease.owner, %version, "session lease rolled back");
				Ok(Some(Released {
					owner,
					previous: SessionStatus::Queued,
					version,
				}))
			}
			WriteOutcome::Conflict => {
				info!(
					target = "rdp.lock",
					owner = %lease.owner,
					lease = %lease.version,
					"document changed since the lease was taken; nothing to roll back"
				);
				Ok(None)
			}
		}
	}
}

/// Splits a read into the document (free when absent) and its version token.
fn split(read: Option<Versioned<SessionDocument>>) -> (SessionDocument, Option<Version>) {
	match read {
		Some(Versioned { value, version }) => (value, Some(version)),
		None => (SessionDocument::default(), None),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::clock::ManualClock;
	use crate::fakes::FakeExecutor;
	use crate::store::MemoryStore;

	fn manager(store: Arc<MemoryStore<SessionDocument>>) -> LockManager {
		LockManager::new(store, Arc::new(ManualClock::new(1_700_000_000)))
	}

	#[tokio::test]
	async fn acquire_on_absent_document_creates_queued_state() {
		let store = Arc::new(MemoryStore::new());
		let lease = manager(store.clone()).acquire("u1").await.unwrap();

		let doc = store.snapshot().unwrap();
		assert_eq!(doc.version, lease.version);
		assert_eq!(doc.value.status, SessionStatus::Queued);
		assert_eq!(doc.value.owner(), Some("u1"));
		assert_eq!(doc.value.started_at, Some(1_700_000_000));
		assert_eq!(doc.value.updated_at, Some(1_700_000_000));
	}

	#[tokio::test]
	async fn acquire_over_stopped_document_carries_its_version() {
		let store = Arc::new(MemoryStore::with_value(SessionDocument::stopped(Some("old".into()), 1, None)));
		manager(store.clone()).acquire("u2").await.unwrap();
		assert_eq!(store.snapshot().unwrap().value.owner(), Some("u2"));
		assert_eq!(store.write_count(), 1);
	}

	#[tokio::test]
	async fn acquire_denies_running_session_without_writing() {
		let mut running = SessionDocument::queued("u1", 1);
		running.status = SessionStatus::Running;
		let store = Arc::new(MemoryStore::with_value(running));

		let err = manager(store.clone()).acquire("u2").await.unwrap_err();
		assert_eq!(
			err.denial(),
			Some(&Denial::AlreadyActive {
				owner: Some("u1".into()),
				status: SessionStatus::Running,
			})
		);
		assert_eq!(store.write_count(), 0);
	}

	#[tokio::test]
	async fn completed_status_counts_as_free() {
		let mut done = SessionDocument::queued("u1", 1);
		done.status = SessionStatus::Completed;
		let store = Arc::new(MemoryStore::with_value(done));
		assert!(manager(store).acquire("u2").await.is_ok());
	}

	#[tokio::test]
	async fn pending_run_denies_even_when_document_is_free() {
		let store = Arc::new(MemoryStore::new());
		let executor = Arc::new(FakeExecutor::new());
		executor.set_busy(true);

		let err = manager(store.clone()).with_probe(executor).acquire("u1").await.unwrap_err();
		assert_eq!(err.denial(), Some(&Denial::WorkflowBusy));
		assert!(store.snapshot().is_none());
	}

	#[tokio::test]
	async fn probe_failure_surfaces_without_writing() {
		let store = Arc::new(MemoryStore::new());
		let executor = Arc::new(FakeExecutor::new());
		executor.fail_probe(true);

		let err = manager(store.clone()).with_probe(executor).acquire("u1").await.unwrap_err();
		assert!(matches!(err, LockError::ProbeUnavailable(_)));
		assert_eq!(store.write_count(), 0);
	}

	#[tokio::test]
	async fn offline_store_is_reported_as_unavailable() {
		let store = Arc::new(MemoryStore::new());
		store.set_offline(true);
		let err = manager(store).acquire("u1").await.unwrap_err();
		assert!(matches!(err, LockError::StoreUnavailable(_)));
	}

	#[tokio::test]
	async fn owner_only_release_of_foreign_session_is_denied() {
		let store = Arc::new(MemoryStore::with_value(SessionDocument::queued("u1", 1)));
		let before = store.snapshot();

		let err = manager(store.clone()).release("u2", ReleaseMode::OwnerOnly, None).await.unwrap_err();
		assert_eq!(err.denial(), Some(&Denial::NotOwner { owner: "u1".into() }));
		assert_eq!(store.snapshot(), before);
	}

	#[tokio::test]
	async fn forced_release_preserves_owner_and_records_note() {
		let store = Arc::new(MemoryStore::with_value(SessionDocument::queued("u1", 1)));
		let released = manager(store.clone())
			.release("admin", ReleaseMode::Forced, Some("dispatch failed"))
			.await
			.unwrap();

		assert_eq!(released.previous, SessionStatus::Queued);
		assert_eq!(released.owner.as_deref(), Some("u1"));
		let doc = store.snapshot().unwrap().value;
		assert_eq!(doc.status, SessionStatus::Stopped);
		assert_eq!(doc.note.as_deref(), Some("dispatch failed"));
		assert_eq!(doc.started_at, None);
	}

	#[tokio::test]
	async fn release_of_absent_document_records_caller() {
		let store = Arc::new(MemoryStore::new());
		let released = manager(store.clone()).release("u3", ReleaseMode::OwnerOnly, None).await.unwrap();
		assert_eq!(released.owner.as_deref(), Some("u3"));
		assert_eq!(store.snapshot().unwrap().value.status, SessionStatus::Stopped);
	}

	#[tokio::test]
	async fn release_of_stopped_foreign_session_is_allowed() {
		let store = Arc::new(MemoryStore::with_value(SessionDocument::stopped(Some("u1".into()), 1, None)));
		let released = manager(store).release("u2", ReleaseMode::OwnerOnly, None).await.unwrap();
		assert_eq!(released.owner.as_deref(), Some("u1"));
	}
}
