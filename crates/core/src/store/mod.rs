//! Versioned document store abstraction.
//!
//! The store is the single source of truth for session state. Every write is
//! conditional on the version token returned by a previous read; a token that
//! no longer matches yields [`WriteOutcome::Conflict`] rather than an error.

use std::fmt;

use async_trait::async_trait;

use crate::error::StoreError;

mod memory;

pub use memory::MemoryStore;

/// Opaque concurrency token issued by the store on every read and write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
	pub fn new(token: impl Into<String>) -> Self {
		Self(token.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A decoded document together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
	pub value: T,
	pub version: Version,
}

/// Result of a conditional write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
	/// The write landed; carries the new version token.
	Committed(Version),
	/// The expected version no longer matches what the store holds.
	Conflict,
}

/// A single document with optimistic-concurrency writes.
#[async_trait]
pub trait VersionedStore<T>: Send + Sync
where
	T: Send + Sync,
{
	/// Reads the document. `None` means it does not exist yet.
	async fn read(&self) -> Result<Option<Versioned<T>>, StoreError>;

	/// Writes `value` if the stored version still equals `expected`.
	///
	/// `expected = None` asserts that the document does not exist yet.
	/// `message` is a human-readable change description (a commit message for
	/// git-backed stores).
	async fn write(&self, value: &T, expected: Option<&Version>, message: &str) -> Result<WriteOutcome, StoreError>;
}
