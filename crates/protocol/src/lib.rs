//! Wire types for the RDP request bot.
//!
//! This crate contains the serde-serializable shapes exchanged with the
//! bot's external collaborators: the shared session state document, the
//! GitHub contents and actions endpoints, the Telegram Bot API and the
//! assistant's responses endpoint.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization and small
//!   accessors over the decoded shape
//! * 1:1 with the wire: field names match what the remote services send
//! * Stable: Changes only when a remote schema changes
//!
//! The lock protocol built on top of these types lives in `rdp-core`.

pub mod assistant;
pub mod github;
mod lenient;
pub mod session;
pub mod telegram;

pub use session::{SessionDocument, SessionStatus};
