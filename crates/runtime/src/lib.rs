//! HTTP adapters behind the `rdp` ports.
//!
//! * [`github::ContentsStore`]: the session document as a file in a
//!   repository, versioned by its blob sha.
//! * [`github::ActionsExecutor`]: workflow dispatch and the run-status probe.
//! * [`telegram::TelegramGateway`]: Bot API long-poll and replies.
//! * [`openai::ResponsesAssistant`]: the assistant chat mode.
//!
//! Every client is built with a bounded per-request timeout; expiry is
//! reported as the port's `Timeout` variant.

pub mod github;
mod http;
pub mod openai;
pub mod telegram;

pub use http::ClientError;
