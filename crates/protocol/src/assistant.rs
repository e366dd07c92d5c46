//! Responses API payloads for the assistant chat mode.

use serde::{Deserialize, Serialize};

/// `POST /v1/responses` request body.
#[derive(Debug, Clone, Serialize)]
pub struct ResponsesRequest<'a> {
	pub model: &'a str,
	pub instructions: &'a str,
	pub input: &'a str,
	pub max_output_tokens: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub previous_response_id: Option<&'a str>,
}

/// `POST /v1/responses` response subset.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsesReply {
	pub id: String,
	#[serde(default)]
	pub output: Vec<OutputItem>,
	/// Convenience field some gateways add; absent on the raw API.
	#[serde(default)]
	pub output_text: Option<String>,
}

impl ResponsesReply {
	/// Concatenates every `output_text` part of every message item.
	pub fn text(&self) -> String {
		if let Some(text) = self.output_text.as_deref().filter(|t| !t.trim().is_empty()) {
			return text.trim().to_string();
		}

		self.output
			.iter()
			.filter(|item| item.kind == "message")
			.flat_map(|item| item.content.iter())
			.filter(|part| part.kind == "output_text")
			.filter_map(|part| part.text.as_deref())
			.collect::<Vec<_>>()
			.join("")
			.trim()
			.to_string()
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputItem {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub content: Vec<OutputContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputContent {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub text: Option<String>,
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
	pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
	#[serde(default)]
	pub message: String,
}
