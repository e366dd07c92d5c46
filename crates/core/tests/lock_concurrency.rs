//! Concurrent acquisition against a shared versioned document.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use rdp::{
	Denial, ErrorKind, LockManager, ManualClock, MemoryStore, SessionDocument, SessionStatus, StoreError,
	Version, Versioned, VersionedStore, WriteOutcome,
};
use tokio::sync::Barrier;

/// Holds every reader until `parties` reads have completed, so all
/// contenders write with the same pre-acquisition version.
struct LockstepStore {
	inner: MemoryStore<SessionDocument>,
	barrier: Barrier,
}

#[async_trait]
impl VersionedStore<SessionDocument> for LockstepStore {
	async fn read(&self) -> Result<Option<Versioned<SessionDocument>>, StoreError> {
		let read = self.inner.read().await;
		self.barrier.wait().await;
		read
	}

	async fn write(
		&self,
		value: &SessionDocument,
		expected: Option<&Version>,
		message: &str,
	) -> Result<WriteOutcome, StoreError> {
		self.inner.write(value, expected, message).await
	}
}

async fn contend(initial: Option<SessionDocument>, parties: usize) -> (Arc<LockstepStore>, Vec<Result<String, ErrorKind>>) {
	let inner = match initial {
		Some(doc) => MemoryStore::with_value(doc),
		None => MemoryStore::new(),
	};
	let store = Arc::new(LockstepStore {
		inner,
		barrier: Barrier::new(parties),
	});
	let lock = LockManager::new(store.clone(), Arc::new(ManualClock::new(1_700_000_000)));

	let attempts = (0..parties).map(|i| {
		let lock = &lock;
		async move {
			lock.acquire(&format!("u{i}"))
				.await
				.map(|lease| lease.owner)
				.map_err(|err| err.kind())
		}
	});
	let results = join_all(attempts).await;
	(store, results)
}

#[tokio::test]
async fn exactly_one_of_concurrent_creates_wins() {
	let (store, results) = contend(None, 8).await;

	let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
	assert_eq!(winners.len(), 1);
	assert!(results.iter().filter(|r| r.is_err()).all(|r| *r == Err(ErrorKind::RaceLost)));

	let doc = store.inner.snapshot().unwrap().value;
	assert_eq!(doc.status, SessionStatus::Queued);
	assert_eq!(doc.owner(), Some(winners[0].as_str()));
	assert_eq!(store.inner.write_count(), 1);
}

#[tokio::test]
async fn exactly_one_of_concurrent_updates_wins() {
	let stopped = SessionDocument::stopped(Some("old".into()), 1, None);
	let (store, results) = contend(Some(stopped), 5).await;

	assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
	assert_eq!(store.inner.write_count(), 1);
}

#[tokio::test]
async fn external_writer_between_read_and_write_loses_nothing() {
	struct Meddler(MemoryStore<SessionDocument>);

	#[async_trait]
	impl VersionedStore<SessionDocument> for Meddler {
		async fn read(&self) -> Result<Option<Versioned<SessionDocument>>, StoreError> {
			let read = self.0.read().await;
			let mut running = SessionDocument::queued("workflow", 2);
			running.status = SessionStatus::Running;
			self.0.put(running);
			read
		}

		async fn write(
			&self,
			value: &SessionDocument,
			expected: Option<&Version>,
			message: &str,
		) -> Result<WriteOutcome, StoreError> {
			self.0.write(value, expected, message).await
		}
	}

	let store = Arc::new(Meddler(MemoryStore::with_value(SessionDocument::default())));
	let lock = LockManager::new(store.clone(), Arc::new(ManualClock::new(10)));

	let err = lock.acquire("u1").await.unwrap_err();
	assert_eq!(err.denial(), Some(&Denial::RaceLost));
	assert_eq!(store.0.snapshot().unwrap().value.owner(), Some("workflow"));
}
