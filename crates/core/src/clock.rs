//! Wall-clock source injected into the lock and cooldown components.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch.
pub trait Clock: Send + Sync {
	fn now(&self) -> u64;
}

/// Clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> u64 {
		SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
	}
}

/// Manually driven clock for tests and dry runs.
#[derive(Debug, Default)]
pub struct ManualClock {
	now: AtomicU64,
}

impl ManualClock {
	pub fn new(start: u64) -> Self {
		Self { now: AtomicU64::new(start) }
	}

	pub fn set(&self, now: u64) {
		self.now.store(now, Ordering::SeqCst);
	}

	pub fn advance(&self, secs: u64) {
		self.now.fetch_add(secs, Ordering::SeqCst);
	}
}

impl Clock for ManualClock {
	fn now(&self) -> u64 {
		self.now.load(Ordering::SeqCst)
	}
}
