//! Telegram Bot API gateway.

use std::time::Duration;

use async_trait::async_trait;
use rdp::{ChatEvent, ChatGateway, GatewayError, PollBatch};
use rdp_protocol::telegram::{
	AnswerCallbackQuery, ApiResponse, EditMessageReplyMarkup, GetUpdates, ReplyMarkup, SendChatAction, SendMessage,
	Update,
};
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, trace};

use crate::http::{self, ClientError, Failure};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

const SERVICE: &str = "Telegram";

/// Update kinds requested from `getUpdates`.
const ALLOWED_UPDATES: [&str; 2] = ["message", "callback_query"];

/// Bot API client; every method is a JSON `POST` to `{api}/bot{token}/{method}`.
#[derive(Clone)]
pub struct TelegramGateway {
	http: Client,
	base: String,
	timeout: Duration,
}

impl std::fmt::Debug for TelegramGateway {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TelegramGateway").field("timeout", &self.timeout).finish_non_exhaustive()
	}
}

impl TelegramGateway {
	pub fn new(token: &str, api_url: &str, timeout: Duration) -> Result<Self, ClientError> {
		let token = token.trim();
		if token.is_empty() || token.contains(['/', '?', '#']) || token.chars().any(char::is_whitespace) {
			return Err(ClientError::InvalidCredential { service: SERVICE });
		}
		Ok(Self {
			http: http::build_client(SERVICE, timeout, HeaderMap::new())?,
			base: http::join(api_url, &format!("bot{token}")),
			timeout,
		})
	}

	async fn call<P, T>(&self, method: &str, params: &P, timeout: Duration) -> Result<T, GatewayError>
	where
		P: Serialize + ?Sized,
		T: DeserializeOwned,
	{
		let response = self
			.http
			.post(http::join(&self.base, method))
			.timeout(timeout)
			.json(params)
			.send()
			.await
			.map_err(transport)?;

		let status = response.status();
		let envelope: ApiResponse<T> = response
			.json()
			.await
			.map_err(|err| GatewayError::Malformed(format!("{method} ({status}): {}", err.without_url())))?;

		if !envelope.ok {
			return Err(GatewayError::Api {
				code: envelope.error_code.or(Some(i64::from(status.as_u16()))),
				description: envelope.description.unwrap_or_else(|| status.to_string()),
			});
		}
		envelope
			.result
			.ok_or_else(|| GatewayError::Malformed(format!("{method} returned ok without a result")))
	}
}

fn transport(err: reqwest::Error) -> GatewayError {
	match Failure::from(err) {
		Failure::Timeout => GatewayError::Timeout,
		Failure::Transport(message) => GatewayError::Transport(message),
	}
}

/// Builds a batch from raw updates, acknowledging ones that carry no event.
fn batch(updates: Vec<Update>, offset: Option<i64>) -> PollBatch {
	let next_offset = updates.iter().map(|u| u.update_id + 1).max().or(offset);
	let events = updates.into_iter().filter_map(ChatEvent::from_update).collect();
	PollBatch { events, next_offset }
}

#[async_trait]
impl ChatGateway for TelegramGateway {
	async fn poll(&self, offset: Option<i64>, timeout_secs: u64) -> Result<PollBatch, GatewayError> {
		let params = GetUpdates {
			offset,
			timeout: timeout_secs,
			allowed_updates: ALLOWED_UPDATES.iter().map(|s| s.to_string()).collect(),
		};
		let updates: Vec<Update> = self
			.call("getUpdates", &params, self.timeout + Duration::from_secs(timeout_secs))
			.await?;
		trace!(target = "rdp.gateway", count = updates.len(), "updates received");
		Ok(batch(updates, offset))
	}

	async fn send(&self, chat_id: i64, text: &str, markup: Option<&ReplyMarkup>) -> Result<(), GatewayError> {
		let params = SendMessage {
			chat_id,
			text,
			parse_mode: "HTML",
			disable_web_page_preview: true,
			reply_markup: markup,
		};
		self.call::<_, IgnoredAny>("sendMessage", &params, self.timeout).await?;
		debug!(target = "rdp.gateway", chat_id, "message sent");
		Ok(())
	}

	async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), GatewayError> {
		let params = AnswerCallbackQuery {
			callback_query_id: callback_id,
			text,
		};
		self.call::<_, IgnoredAny>("answerCallbackQuery", &params, self.timeout).await?;
		Ok(())
	}

	async fn edit_markup(&self, chat_id: i64, message_id: i64, markup: &ReplyMarkup) -> Result<(), GatewayError> {
		let params = EditMessageReplyMarkup {
			chat_id,
			message_id,
			reply_markup: markup,
		};
		match self.call::<_, IgnoredAny>("editMessageReplyMarkup", &params, self.timeout).await {
			Err(GatewayError::Api { description, .. }) if description.contains("message is not modified") => {
				debug!(target = "rdp.gateway", chat_id, message_id, "markup unchanged");
				Ok(())
			}
			other => other.map(|_| ()),
		}
	}

	async fn typing(&self, chat_id: i64) -> Result<(), GatewayError> {
		let params = SendChatAction { chat_id, action: "typing" };
		self.call::<_, IgnoredAny>("sendChatAction", &params, self.timeout).await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn batch_acknowledges_ignored_updates() {
		let updates: Vec<Update> = serde_json::from_value(json!([
			{ "update_id": 7, "message": { "message_id": 1, "chat": { "id": 1 }, "text": "hi" } },
			{ "update_id": 8, "message": { "message_id": 2, "chat": { "id": 1 } } }
		]))
		.unwrap();

		let batch = batch(updates, Some(7));
		assert_eq!(batch.events.len(), 1);
		assert_eq!(batch.next_offset, Some(9));
	}

	#[test]
	fn empty_batch_keeps_offset() {
		assert_eq!(batch(Vec::new(), Some(42)).next_offset, Some(42));
	}

	#[test]
	fn token_is_validated() {
		assert!(TelegramGateway::new("123:abc", DEFAULT_API_URL, Duration::from_secs(1)).is_ok());
		assert!(matches!(
			TelegramGateway::new("12 3", DEFAULT_API_URL, Duration::from_secs(1)),
			Err(ClientError::InvalidCredential { service: "Telegram" })
		));
	}
}
