//! Responses API client for the assistant chat mode.

use std::time::Duration;

use async_trait::async_trait;
use rdp::{Assistant, AssistantError, Completion};
use rdp_protocol::assistant::{ApiErrorEnvelope, ResponsesReply, ResponsesRequest};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use tracing::debug;

use crate::http::{self, ClientError, Failure};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-5-mini";

const SERVICE: &str = "OpenAI";
const MAX_OUTPUT_TOKENS: u32 = 700;
const INSTRUCTIONS: &str = "You are a friendly assistant inside a Telegram bot. Answer naturally and concisely. \
	Prefer Vietnamese unless the user writes in another language. \
	If a question is ambiguous, ask one short clarifying question.";

#[derive(Debug, Clone)]
pub struct ResponsesAssistant {
	http: Client,
	api_url: String,
	model: String,
}

impl ResponsesAssistant {
	pub fn new(api_key: &str, api_url: &str, model: &str, timeout: Duration) -> Result<Self, ClientError> {
		let mut headers = HeaderMap::new();
		headers.insert(AUTHORIZATION, http::bearer(SERVICE, api_key)?);
		Ok(Self {
			http: http::build_client(SERVICE, timeout, headers)?,
			api_url: api_url.to_string(),
			model: model.to_string(),
		})
	}

	pub fn model(&self) -> &str {
		&self.model
	}
}

fn transport(err: reqwest::Error) -> AssistantError {
	match Failure::from(err) {
		Failure::Timeout => AssistantError::Timeout,
		Failure::Transport(message) => AssistantError::Transport(message),
	}
}

#[async_trait]
impl Assistant for ResponsesAssistant {
	async fn complete(&self, conversation_ref: Option<&str>, prompt: &str) -> Result<Completion, AssistantError> {
		let request = ResponsesRequest {
			model: &self.model,
			instructions: INSTRUCTIONS,
			input: prompt,
			max_output_tokens: MAX_OUTPUT_TOKENS,
			previous_response_id: conversation_ref,
		};
		let response = self
			.http
			.post(http::join(&self.api_url, "responses"))
			.json(&request)
			.send()
			.await
			.map_err(transport)?;

		let status = response.status();
		if !status.is_success() {
			let excerpt = http::body_excerpt(response).await;
			let message = serde_json::from_str::<ApiErrorEnvelope>(&excerpt)
				.map(|envelope| envelope.error.message)
				.unwrap_or(excerpt);
			return Err(AssistantError::Api {
				status: status.as_u16(),
				message,
			});
		}

		let reply: ResponsesReply = response
			.json()
			.await
			.map_err(|err| AssistantError::Malformed(err.without_url().to_string()))?;
		let text = reply.text();
		debug!(target = "rdp.assistant", model = %self.model, response_id = %reply.id, chars = text.len(), "assistant replied");
		Ok(Completion {
			text,
			conversation_ref: Some(reply.id),
		})
	}
}
