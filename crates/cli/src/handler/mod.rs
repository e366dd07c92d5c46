//! Chat event routing.
//!
//! Every remote failure below this point becomes a chat message; only a failed
//! send to the chat itself is returned to the polling loop.

mod chat;
mod create;
pub mod keyboards;
pub mod messages;

use std::collections::BTreeSet;
use std::sync::Arc;

use rdp::{Assistant, ChatEvent, ChatGateway, Clock, EventKind, GatewayError, SessionBroker};
use rdp_protocol::telegram::ReplyMarkup;
use tracing::{debug, info, warn};

use self::keyboards::{Button, Callback};
use crate::users::{Step, UserBook};

/// Note written on the document by an admin reset from chat.
pub const ADMIN_RESET_NOTE: &str = "reset by telegram";

pub struct Handler {
	broker: Arc<SessionBroker>,
	gateway: Arc<dyn ChatGateway>,
	assistant: Option<Arc<dyn Assistant>>,
	users: UserBook,
	admins: BTreeSet<i64>,
	clock: Arc<dyn Clock>,
}

impl Handler {
	pub fn new(broker: Arc<SessionBroker>, gateway: Arc<dyn ChatGateway>, users: UserBook, clock: Arc<dyn Clock>) -> Self {
		Self {
			broker,
			gateway,
			assistant: None,
			users,
			admins: BTreeSet::new(),
			clock,
		}
	}

	pub fn with_assistant(mut self, assistant: Option<Arc<dyn Assistant>>) -> Self {
		self.assistant = assistant;
		self
	}

	pub fn with_admins(mut self, admins: BTreeSet<i64>) -> Self {
		self.admins = admins;
		self
	}

	pub fn users(&self) -> &UserBook {
		&self.users
	}

	pub async fn handle(&self, event: ChatEvent) -> Result<(), GatewayError> {
		debug!(target = "rdp.bot", update_id = event.update_id, chat_id = event.chat_id, kind = ?event.kind, "handling event");
		match &event.kind {
			EventKind::Command { name, .. } => self.on_command(&event, name).await,
			EventKind::Text(text) => self.on_text(&event, text).await,
			EventKind::Callback { id, data, message_id } => self.on_callback(&event, id, data, *message_id).await,
		}
	}

	async fn on_command(&self, event: &ChatEvent, name: &str) -> Result<(), GatewayError> {
		match name {
			"start" | "menu" => self.show_menu(event).await,
			"help" => self.show_help(event.chat_id).await,
			"status" => self.show_status(event.chat_id).await,
			"reset" => self.reset(event).await,
			"create" => self.start_create(event.chat_id).await,
			_ => self.unknown(event.chat_id).await,
		}
	}

	async fn on_text(&self, event: &ChatEvent, text: &str) -> Result<(), GatewayError> {
		match Button::from_text(text) {
			Some(Button::Create) => self.start_create(event.chat_id).await,
			Some(Button::Session) => self.show_status(event.chat_id).await,
			Some(Button::Reset) => self.reset(event).await,
			Some(Button::Assistant) => self.enter_chat(event.chat_id).await,
			Some(Button::Help) => self.show_help(event.chat_id).await,
			Some(Button::Menu) => self.show_menu(event).await,
			Some(Button::ClearChat) => self.clear_chat(event.chat_id).await,
			None if self.users.get(event.chat_id).chat_mode => self.relay(event.chat_id, text).await,
			None => self.unknown(event.chat_id).await,
		}
	}

	async fn on_callback(&self, event: &ChatEvent, callback_id: &str, data: &str, message_id: Option<i64>) -> Result<(), GatewayError> {
		let chat_id = event.chat_id;
		let Some(callback) = Callback::parse(data) else {
			debug!(target = "rdp.bot", data, "ignoring unknown callback");
			return self.gateway.answer_callback(callback_id, None).await;
		};

		match callback {
			Callback::Os(os) => {
				self.users.update(chat_id, |s| {
					s.chosen_os = Some(os.clone());
					s.step = Step::PickCount;
				});
				self.gateway.answer_callback(callback_id, Some("OK, now pick the count 👇")).await?;
				self.gateway
					.send(chat_id, &messages::os_chosen(&os), Some(&keyboards::count_picker()))
					.await
			}
			Callback::ToggleLanguage => {
				let language = self.users.update(chat_id, |s| s.toggle_language().to_string());
				let toast = format!("Language: {language}");
				self.gateway.answer_callback(callback_id, Some(toast.as_str())).await?;
				match message_id {
					Some(message_id) => {
						self.gateway
							.edit_markup(chat_id, message_id, &keyboards::os_picker(&language))
							.await
					}
					None => Ok(()),
				}
			}
			Callback::BackToOs => {
				let language = self.users.update(chat_id, |s| {
					s.step = Step::PickOs;
					s.language.clone()
				});
				self.gateway.answer_callback(callback_id, None).await?;
				self.gateway
					.send(chat_id, messages::os_prompt(), Some(&keyboards::os_picker(&language)))
					.await
			}
			Callback::Count(count) => {
				if self.users.get(chat_id).chosen_os.is_none() {
					return self.gateway.answer_callback(callback_id, Some(messages::pick_os_first())).await;
				}
				self.gateway.answer_callback(callback_id, Some("Starting the workflow…")).await?;
				self.submit(event, count).await
			}
			Callback::Create => {
				self.gateway.answer_callback(callback_id, None).await?;
				self.start_create(chat_id).await
			}
			Callback::LastSession => {
				self.gateway.answer_callback(callback_id, None).await?;
				self.show_status(chat_id).await
			}
			Callback::Reset => {
				self.gateway.answer_callback(callback_id, None).await?;
				self.reset(event).await
			}
			Callback::Help => {
				self.gateway.answer_callback(callback_id, None).await?;
				self.show_help(chat_id).await
			}
		}
	}

	/// Sends `text` with the main reply keyboard.
	async fn reply(&self, chat_id: i64, text: &str) -> Result<(), GatewayError> {
		self.reply_with(chat_id, text, &keyboards::main_keyboard()).await
	}

	async fn reply_with(&self, chat_id: i64, text: &str, markup: &ReplyMarkup) -> Result<(), GatewayError> {
		self.gateway.send(chat_id, text, Some(markup)).await
	}

	/// Unrecognized input gets the inline menu, which works without the reply keyboard.
	async fn unknown(&self, chat_id: i64) -> Result<(), GatewayError> {
		self.reply_with(chat_id, messages::unknown_input(), &keyboards::legacy_menu()).await
	}

	async fn show_menu(&self, event: &ChatEvent) -> Result<(), GatewayError> {
		self.users.update(event.chat_id, |s| s.back_to_menu());
		self.reply(event.chat_id, &messages::welcome(&event.sender_name)).await
	}

	async fn show_help(&self, chat_id: i64) -> Result<(), GatewayError> {
		self.reply(chat_id, &messages::help(self.broker.cooldown().window())).await
	}

	async fn show_status(&self, chat_id: i64) -> Result<(), GatewayError> {
		let text = match self.broker.query().await {
			Ok(doc) => {
				let last = self.users.get(chat_id).last_request;
				messages::status(&doc, last.as_ref(), &chat_id.to_string(), self.clock.now())
			}
			Err(err) => {
				warn!(target = "rdp.bot", chat_id, error = %err, "status query failed");
				messages::lock_failed(&err)
			}
		};
		self.reply(chat_id, &text).await
	}

	/// Owner-gated reset; configured admins skip the owner check.
	async fn reset(&self, event: &ChatEvent) -> Result<(), GatewayError> {
		let caller = event.chat_id.to_string();
		let result = if self.admins.contains(&event.chat_id) {
			self.broker.force_reset(&caller, Some(ADMIN_RESET_NOTE)).await
		} else {
			self.broker.reset(&caller).await
		};

		let text = match result {
			Ok(released) => {
				info!(target = "rdp.bot", caller = %caller, previous = %released.previous, "session reset from chat");
				messages::reset_done(&released)
			}
			Err(err) => {
				if err.denial().is_none() {
					warn!(target = "rdp.bot", caller = %caller, error = %err, "reset failed");
				}
				messages::lock_failed(&err)
			}
		};
		self.reply(event.chat_id, &text).await
	}
}
