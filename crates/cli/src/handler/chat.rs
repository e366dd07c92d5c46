use rdp::GatewayError;
use tracing::{debug, warn};

use super::{Handler, keyboards, messages};
use crate::users::Step;

impl Handler {
	pub(super) async fn enter_chat(&self, chat_id: i64) -> Result<(), GatewayError> {
		if self.assistant.is_none() {
			return self.reply(chat_id, messages::assistant_disabled()).await;
		}
		self.users.update(chat_id, |s| {
			s.chat_mode = true;
			s.step = Step::Idle;
		});
		self.reply_with(chat_id, messages::assistant_on(), &keyboards::chat_keyboard()).await
	}

	pub(super) async fn clear_chat(&self, chat_id: i64) -> Result<(), GatewayError> {
		let chat_mode = self.users.update(chat_id, |s| {
			s.conversation_ref = None;
			s.chat_mode
		});
		let markup = if chat_mode { keyboards::chat_keyboard() } else { keyboards::main_keyboard() };
		self.reply_with(chat_id, messages::assistant_cleared(), &markup).await
	}

	/// Forwards `text` to the assistant, continuing the chat's conversation.
	pub(super) async fn relay(&self, chat_id: i64, text: &str) -> Result<(), GatewayError> {
		let Some(assistant) = &self.assistant else {
			self.users.update(chat_id, |s| s.back_to_menu());
			return self.reply(chat_id, messages::assistant_disabled()).await;
		};

		if let Err(err) = self.gateway.typing(chat_id).await {
			debug!(target = "rdp.assistant", chat_id, error = %err, "typing indicator failed");
		}

		let previous = self.users.get(chat_id).conversation_ref;
		let reply = match assistant.complete(previous.as_deref(), text).await {
			Ok(completion) => {
				self.users.update(chat_id, |s| s.conversation_ref = completion.conversation_ref);
				messages::assistant_reply(&completion.text)
			}
			Err(err) => {
				warn!(target = "rdp.assistant", chat_id, error = %err, "assistant request failed");
				messages::assistant_failed(&err)
			}
		};
		self.reply_with(chat_id, &reply, &keyboards::chat_keyboard()).await
	}
}
