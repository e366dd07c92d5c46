//! In-memory [`VersionedStore`] for tests and offline runs.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Version, Versioned, VersionedStore, WriteOutcome};
use crate::error::StoreError;

/// Process-local store with the same conditional-write semantics as the
/// remote one.
///
/// Versions are monotonically increasing `v{n}` tokens. The store can be
/// switched offline to exercise `store_unavailable` paths.
#[derive(Debug)]
pub struct MemoryStore<T> {
	slot: Mutex<Option<Versioned<T>>>,
	next_version: AtomicU64,
	writes: AtomicU64,
	offline: AtomicBool,
}

impl<T> Default for MemoryStore<T> {
	fn default() -> Self {
		Self {
			slot: Mutex::new(None),
			next_version: AtomicU64::new(1),
			writes: AtomicU64::new(0),
			offline: AtomicBool::new(false),
		}
	}
}

impl<T: Clone> MemoryStore<T> {
	/// Creates an empty store (document absent).
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a store already holding `value`.
	pub fn with_value(value: T) -> Self {
		let store = Self::default();
		store.put(value);
		store
	}

	/// Overwrites the document unconditionally, as an external writer would.
	pub fn put(&self, value: T) -> Version {
		let version = self.bump();
		*self.slot.lock() = Some(Versioned {
			value,
			version: version.clone(),
		});
		version
	}

	/// Returns the current document without going through the async API.
	pub fn snapshot(&self) -> Option<Versioned<T>> {
		self.slot.lock().clone()
	}

	/// Number of successful conditional writes.
	pub fn write_count(&self) -> u64 {
		self.writes.load(Ordering::SeqCst)
	}

	/// Makes every subsequent read and write fail with a transport error.
	pub fn set_offline(&self, offline: bool) {
		self.offline.store(offline, Ordering::SeqCst);
	}

	fn bump(&self) -> Version {
		Version::new(format!("v{}", self.next_version.fetch_add(1, Ordering::SeqCst)))
	}

	fn check_online(&self) -> Result<(), StoreError> {
		if self.offline.load(Ordering::SeqCst) {
			return Err(StoreError::Transport("memory store is offline".to_string()));
		}
		Ok(())
	}
}

#[async_trait]
impl<T> VersionedStore<T> for MemoryStore<T>
where
	T: Clone + Send + Sync,
{
	async fn read(&self) -> Result<Option<Versioned<T>>, StoreError> {
		self.check_online()?;
		Ok(self.snapshot())
	}

	async fn write(&self, value: &T, expected: Option<&Version>, _message: &str) -> Result<WriteOutcome, StoreError> {
		self.check_online()?;
		let mut slot = self.slot.lock();
		let current = slot.as_ref().map(|v| &v.version);
		if current != expected {
			return Ok(WriteOutcome::Conflict);
		}

		let version = self.bump();
		*slot = Some(Versioned {
			value: value.clone(),
			version: version.clone(),
		});
		self.writes.fetch_add(1, Ordering::SeqCst);
		Ok(WriteOutcome::Committed(version))
	}
}
