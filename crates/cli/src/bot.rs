//! Long-polling loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rdp::{ChatGateway, PollBatch};
use tracing::{debug, info, warn};

use crate::handler::Handler;

/// Seconds each `getUpdates` call waits server-side for new updates.
pub const POLL_TIMEOUT_SECS: u64 = 20;
/// Pause after a failed poll.
pub const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
	pub handled: u64,
	pub poll_errors: u64,
	pub handler_errors: u64,
}

pub struct Bot {
	handler: Handler,
	gateway: Arc<dyn ChatGateway>,
	poll_timeout_secs: u64,
	backoff: Duration,
}

impl Bot {
	pub fn new(handler: Handler, gateway: Arc<dyn ChatGateway>) -> Self {
		Self {
			handler,
			gateway,
			poll_timeout_secs: POLL_TIMEOUT_SECS,
			backoff: ERROR_BACKOFF,
		}
	}

	pub fn with_backoff(mut self, backoff: Duration) -> Self {
		self.backoff = backoff;
		self
	}

	/// Polls and handles events until `shutdown` resolves.
	///
	/// Shutdown interrupts a pending poll or back-off, never an event that is
	/// being handled.
	pub async fn run_until(&self, shutdown: impl Future<Output = ()>) -> RunStats {
		tokio::pin!(shutdown);
		let mut stats = RunStats::default();
		let mut offset = None;
		info!(target = "rdp.bot", "polling for updates");

		loop {
			let polled = tokio::select! {
				_ = &mut shutdown => break,
				polled = self.gateway.poll(offset, self.poll_timeout_secs) => polled,
			};

			match polled {
				Ok(batch) => offset = self.handle_batch(batch, offset, &mut stats).await,
				Err(err) => {
					stats.poll_errors += 1;
					warn!(target = "rdp.bot", error = %err, backoff_ms = self.backoff.as_millis() as u64, "polling failed");
					tokio::select! {
						_ = &mut shutdown => break,
						_ = tokio::time::sleep(self.backoff) => {}
					}
				}
			}
		}

		info!(target = "rdp.bot", handled = stats.handled, poll_errors = stats.poll_errors, "polling stopped");
		stats
	}

	/// Handles every event in order; the offset advances even past failures.
	async fn handle_batch(&self, batch: PollBatch, offset: Option<i64>, stats: &mut RunStats) -> Option<i64> {
		for event in batch.events {
			let update_id = event.update_id;
			match self.handler.handle(event).await {
				Ok(()) => stats.handled += 1,
				Err(err) => {
					stats.handler_errors += 1;
					warn!(target = "rdp.bot", update_id, error = %err, "reply could not be delivered");
				}
			}
		}
		if batch.next_offset.is_some() && batch.next_offset != offset {
			debug!(target = "rdp.bot", offset = ?batch.next_offset, "advanced update offset");
		}
		batch.next_offset.or(offset)
	}
}
