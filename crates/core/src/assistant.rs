//! Assistant text service port.

use async_trait::async_trait;

use crate::error::AssistantError;

/// One assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
	pub text: String,
	/// Reference to pass back on the next turn to continue the conversation.
	pub conversation_ref: Option<String>,
}

#[async_trait]
pub trait Assistant: Send + Sync {
	async fn complete(&self, conversation_ref: Option<&str>, prompt: &str) -> Result<Completion, AssistantError>;
}
