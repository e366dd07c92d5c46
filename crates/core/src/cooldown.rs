//! Per-caller cooldown in front of the lock's acquire path.
//!
//! Process-local and advisory: it only stops one impatient caller from
//! hammering the remote store. It does not coordinate across processes; the
//! conditional write in [`LockManager`](crate::LockManager) does that.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::clock::Clock;

/// Map size above which expired entries are pruned on the next admit.
const EVICT_THRESHOLD: usize = 1024;

/// Denial returned by [`CooldownGate::admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownDenied {
	/// Seconds until the caller is admitted again.
	pub retry_after: u64,
}

/// Rate limiter keyed by caller id.
pub struct CooldownGate {
	window: u64,
	clock: Arc<dyn Clock>,
	last_allowed: Mutex<HashMap<String, u64>>,
}

impl CooldownGate {
	/// Creates a gate with a `window_secs` minimum interval between admits.
	pub fn new(window_secs: u64, clock: Arc<dyn Clock>) -> Self {
		Self::with_ledger(window_secs, clock, HashMap::new())
	}

	/// Creates a gate seeded with previously recorded admits.
	pub fn with_ledger(window_secs: u64, clock: Arc<dyn Clock>, ledger: HashMap<String, u64>) -> Self {
		Self {
			window: window_secs,
			clock,
			last_allowed: Mutex::new(ledger),
		}
	}

	pub fn window(&self) -> u64 {
		self.window
	}

	/// Returns `true` and records `now` when `caller` is outside its window.
	///
	/// A clock that moved backwards counts as "inside the window".
	pub fn allow_at(&self, caller: &str, now: u64) -> bool {
		let mut last_allowed = self.last_allowed.lock();
		if let Some(&last) = last_allowed.get(caller) {
			if now.saturating_sub(last) < self.window || now < last {
				return false;
			}
		}

		if last_allowed.len() >= EVICT_THRESHOLD {
			let before = last_allowed.len();
			last_allowed.retain(|_, last| now.saturating_sub(*last) < self.window);
			debug!(target = "rdp.cooldown", evicted = before - last_allowed.len(), "pruned expired cooldown entries");
		}

		last_allowed.insert(caller.to_string(), now);
		true
	}

	/// Seconds `caller` still has to wait at `now`; zero when admitted.
	pub fn retry_after_at(&self, caller: &str, now: u64) -> u64 {
		let last_allowed = self.last_allowed.lock();
		match last_allowed.get(caller) {
			Some(&last) if now < last => self.window,
			Some(&last) => self.window.saturating_sub(now - last),
			None => 0,
		}
	}

	/// Admits `caller` at the injected clock's current time.
	pub fn admit(&self, caller: &str) -> Result<(), CooldownDenied> {
		let now = self.clock.now();
		if self.allow_at(caller, now) {
			Ok(())
		} else {
			Err(CooldownDenied {
				retry_after: self.retry_after_at(caller, now).max(1),
			})
		}
	}

	/// Number of callers currently tracked.
	pub fn tracked(&self) -> usize {
		self.last_allowed.lock().len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::clock::ManualClock;

	fn gate(window: u64) -> (CooldownGate, Arc<ManualClock>) {
		let clock = Arc::new(ManualClock::new(1_000));
		(CooldownGate::new(window, clock.clone()), clock)
	}

	#[test]
	fn second_attempt_inside_window_is_denied() {
		let (gate, _) = gate(60);
		let t = 1_000;
		assert!(gate.allow_at("caller", t));
		assert!(!gate.allow_at("caller", t + 30));
		assert!(gate.allow_at("caller", t + 61));
	}

	#[test]
	fn denial_does_not_extend_the_window() {
		let (gate, _) = gate(60);
		assert!(gate.allow_at("caller", 0));
		assert!(!gate.allow_at("caller", 59));
		assert!(gate.allow_at("caller", 60));
	}

	#[test]
	fn callers_are_independent() {
		let (gate, _) = gate(60);
		assert!(gate.allow_at("a", 10));
		assert!(gate.allow_at("b", 11));
		assert!(!gate.allow_at("a", 12));
	}

	#[test]
	fn backwards_clock_fails_closed() {
		let (gate, _) = gate(60);
		assert!(gate.allow_at("caller", 500));
		assert!(!gate.allow_at("caller", 100));
		assert_eq!(gate.retry_after_at("caller", 100), 60);
	}

	#[test]
	fn zero_window_always_admits() {
		let (gate, _) = gate(0);
		assert!(gate.allow_at("caller", 5));
		assert!(gate.allow_at("caller", 5));
	}

	#[test]
	fn admit_reports_remaining_wait() {
		let (gate, clock) = gate(60);
		assert_eq!(gate.admit("caller"), Ok(()));
		clock.advance(45);
		assert_eq!(gate.admit("caller"), Err(CooldownDenied { retry_after: 15 }));
		clock.advance(15);
		assert_eq!(gate.admit("caller"), Ok(()));
	}

	#[test]
	fn expired_entries_are_pruned_past_threshold() {
		let (gate, _) = gate(60);
		for i in 0..EVICT_THRESHOLD {
			assert!(gate.allow_at(&format!("old-{i}"), 0));
		}
		assert_eq!(gate.tracked(), EVICT_THRESHOLD);

		assert!(gate.allow_at("fresh", 1_000));
		assert_eq!(gate.tracked(), 1);
	}
}
