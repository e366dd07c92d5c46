//! Messaging gateway port.
//!
//! The bot loop only sees [`ChatEvent`]s; the Telegram adapter lives in
//! `rdp-runtime` and converts raw updates with [`ChatEvent::from_update`].

use async_trait::async_trait;
use rdp_protocol::telegram::{ReplyMarkup, Update};

use crate::error::GatewayError;

/// One inbound user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
	pub update_id: i64,
	pub chat_id: i64,
	pub sender_id: i64,
	pub sender_name: String,
	pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
	/// `/name args`; the name is lowercased and stripped of any `@bot` suffix.
	Command { name: String, args: String },
	Text(String),
	Callback {
		id: String,
		data: String,
		message_id: Option<i64>,
	},
}

/// Events from one poll plus the offset that acknowledges them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollBatch {
	pub events: Vec<ChatEvent>,
	/// `update_id + 1` of the last update seen, including ignored ones.
	pub next_offset: Option<i64>,
}

impl ChatEvent {
	/// Converts a raw update; updates without text or callback data are ignored.
	pub fn from_update(update: Update) -> Option<Self> {
		if let Some(query) = update.callback_query {
			let chat_id = query.message.as_ref().map(|m| m.chat.id).unwrap_or(query.from.id);
			return Some(Self {
				update_id: update.update_id,
				chat_id,
				sender_id: query.from.id,
				sender_name: display_name(&query.from.first_name, query.from.username.as_deref()),
				kind: EventKind::Callback {
					id: query.id,
					data: query.data.unwrap_or_default(),
					message_id: query.message.map(|m| m.message_id),
				},
			});
		}

		let message = update.message?;
		let text = message.text?;
		let (sender_id, sender_name) = match &message.from {
			Some(user) => (user.id, display_name(&user.first_name, user.username.as_deref())),
			None => (message.chat.id, String::new()),
		};
		Some(Self {
			update_id: update.update_id,
			chat_id: message.chat.id,
			sender_id,
			sender_name,
			kind: parse_text(&text),
		})
	}
}

fn display_name(first_name: &str, username: Option<&str>) -> String {
	match (first_name.trim(), username) {
		("", Some(username)) => format!("@{username}"),
		(first, _) => first.to_string(),
	}
}

fn parse_text(text: &str) -> EventKind {
	let trimmed = text.trim();
	let Some(rest) = trimmed.strip_prefix('/') else {
		return EventKind::Text(trimmed.to_string());
	};

	let (head, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
	let name = head.split('@').next().unwrap_or_default().to_ascii_lowercase();
	if name.is_empty() {
		return EventKind::Text(trimmed.to_string());
	}
	EventKind::Command {
		name,
		args: args.trim().to_string(),
	}
}

/// Outbound side of the messaging platform plus the long-poll.
#[async_trait]
pub trait ChatGateway: Send + Sync {
	async fn poll(&self, offset: Option<i64>, timeout_secs: u64) -> Result<PollBatch, GatewayError>;

	/// Sends an HTML-formatted message.
	async fn send(&self, chat_id: i64, text: &str, markup: Option<&ReplyMarkup>) -> Result<(), GatewayError>;

	async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), GatewayError>;

	async fn edit_markup(&self, chat_id: i64, message_id: i64, markup: &ReplyMarkup) -> Result<(), GatewayError>;

	/// Shows the "typing…" indicator.
	async fn typing(&self, chat_id: i64) -> Result<(), GatewayError>;
}
