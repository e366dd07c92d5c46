//! Single-flight RDP session lock.
//!
//! At most one RDP session may be requested at a time. The lock lives in a
//! shared JSON document in a remote, versioned store; every transition is a
//! read followed by a write conditioned on the version token that read
//! returned, so concurrent requesters in different processes cannot both win.
//!
//! The request path is:
//!
//! ```text
//! CooldownGate::admit -> LockManager::reserve -> Reservation::commit
//!                                                 |
//!                                                 +-- dispatch fails -> lease rollback
//! ```
//!
//! [`session::SessionBroker`] wires these together and also exposes the
//! read-only query and owner-gated reset used by the chat front-end.

pub mod assistant;
pub mod clock;
pub mod cooldown;
pub mod dispatch;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod fakes;
pub mod gateway;
pub mod lock;
pub mod session;
pub mod store;

pub use assistant::{Assistant, Completion};
pub use clock::{Clock, ManualClock, SystemClock};
pub use cooldown::{CooldownDenied, CooldownGate};
pub use dispatch::{
	DispatchTarget, JobExecutor, JobInputs, JobRequest, Reservation, RunProbe, Submitted,
};
pub use error::{
	AssistantError, Denial, ErrorKind, ExecutorError, GatewayError, LockError, RequestError, StoreError,
};
pub use gateway::{ChatEvent, ChatGateway, EventKind, PollBatch};
pub use lock::{Lease, LockManager, ReleaseMode, Released};
pub use rdp_protocol::{SessionDocument, SessionStatus};
pub use session::SessionBroker;
pub use store::{MemoryStore, Version, Versioned, VersionedStore, WriteOutcome};
