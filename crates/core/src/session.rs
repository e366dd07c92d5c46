//! Request, query and reset façade used by the chat front-end and the
//! operator commands.

use std::sync::Arc;

use rdp_protocol::SessionDocument;
use tracing::{debug, info};

use crate::cooldown::CooldownGate;
use crate::dispatch::{DispatchTarget, JobExecutor, JobInputs, Submitted};
use crate::error::{LockError, RequestError};
use crate::lock::{LockManager, ReleaseMode, Released};

/// Ties the cooldown gate, the lock and the executor together.
pub struct SessionBroker {
	lock: LockManager,
	executor: Arc<dyn JobExecutor>,
	cooldown: CooldownGate,
	target: DispatchTarget,
}

impl SessionBroker {
	pub fn new(lock: LockManager, executor: Arc<dyn JobExecutor>, cooldown: CooldownGate, target: DispatchTarget) -> Self {
		Self {
			lock,
			executor,
			cooldown,
			target,
		}
	}

	pub fn target(&self) -> &DispatchTarget {
		&self.target
	}

	pub fn cooldown(&self) -> &CooldownGate {
		&self.cooldown
	}

	/// Cooldown, acquire, then dispatch with compensation.
	pub async fn request(&self, caller: &str, inputs: JobInputs) -> Result<Submitted, RequestError> {
		if let Err(denied) = self.cooldown.admit(caller) {
			debug!(target = "rdp.cooldown", caller, retry_after = denied.retry_after, "request cooling down");
			return Err(RequestError::CoolingDown {
				retry_after: denied.retry_after,
			});
		}

		let reservation = self.lock.reserve(caller).await?;
		reservation.commit(self.executor.as_ref(), self.target.job(inputs)).await
	}

	/// Current document; a never-written document reads as free.
	pub async fn query(&self) -> Result<SessionDocument, LockError> {
		Ok(self.lock.inspect().await?.map(|read| read.value).unwrap_or_default())
	}

	/// Owner-gated release.
	pub async fn reset(&self, caller: &str) -> Result<Released, LockError> {
		self.lock.release(caller, ReleaseMode::OwnerOnly, None).await
	}

	/// Release that skips the owner gate. Callers check authorization.
	pub async fn force_reset(&self, actor: &str, note: Option<&str>) -> Result<Released, LockError> {
		info!(target = "rdp.lock", actor, "administrative reset");
		self.lock.release(actor, ReleaseMode::Forced, note).await
	}
}
