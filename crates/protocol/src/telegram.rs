//! Telegram Bot API payloads.
//!
//! Only the methods and update fields the bot consumes are modelled.

use serde::{Deserialize, Serialize};

/// Envelope wrapping every Bot API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
	pub ok: bool,
	#[serde(default = "Option::default")]
	pub result: Option<T>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub error_code: Option<i64>,
	#[serde(default)]
	pub parameters: Option<ResponseParameters>,
}

/// Extra hints attached to failed responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseParameters {
	#[serde(default)]
	pub retry_after: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
	pub update_id: i64,
	#[serde(default)]
	pub message: Option<Message>,
	#[serde(default)]
	pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
	pub message_id: i64,
	pub chat: Chat,
	#[serde(default)]
	pub from: Option<User>,
	#[serde(default)]
	pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
	pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
	pub id: i64,
	#[serde(default)]
	pub first_name: String,
	#[serde(default)]
	pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
	pub id: String,
	pub from: User,
	#[serde(default)]
	pub message: Option<Message>,
	#[serde(default)]
	pub data: Option<String>,
}

/// Keyboard attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
	Inline(InlineKeyboardMarkup),
	Keyboard(ReplyKeyboardMarkup),
	Remove(ReplyKeyboardRemove),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
	pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
	pub text: String,
	pub callback_data: String,
}

impl InlineKeyboardButton {
	pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			callback_data: callback_data.into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyKeyboardMarkup {
	pub keyboard: Vec<Vec<KeyboardButton>>,
	#[serde(default)]
	pub resize_keyboard: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardButton {
	pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyKeyboardRemove {
	pub remove_keyboard: bool,
}

/// `getUpdates` parameters.
#[derive(Debug, Clone, Serialize)]
pub struct GetUpdates {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub offset: Option<i64>,
	pub timeout: u64,
	pub allowed_updates: Vec<String>,
}

/// `sendMessage` parameters.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessage<'a> {
	pub chat_id: i64,
	pub text: &'a str,
	pub parse_mode: &'static str,
	pub disable_web_page_preview: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reply_markup: Option<&'a ReplyMarkup>,
}

/// `answerCallbackQuery` parameters.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerCallbackQuery<'a> {
	pub callback_query_id: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub text: Option<&'a str>,
}

/// `editMessageReplyMarkup` parameters.
#[derive(Debug, Clone, Serialize)]
pub struct EditMessageReplyMarkup<'a> {
	pub chat_id: i64,
	pub message_id: i64,
	pub reply_markup: &'a ReplyMarkup,
}

/// `sendChatAction` parameters.
#[derive(Debug, Clone, Serialize)]
pub struct SendChatAction<'a> {
	pub chat_id: i64,
	pub action: &'a str,
}
