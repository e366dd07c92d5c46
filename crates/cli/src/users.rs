//! Per-chat dialog state.
//!
//! Process-local and lost on restart; the shared session state lives in the
//! remote document, not here.

use std::collections::HashMap;

use parking_lot::Mutex;

pub const LANG_VIETNAMESE: &str = "Tiếng Việt";
pub const LANG_ENGLISH: &str = "English";

/// Where the user is in the create dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Step {
	#[default]
	Idle,
	PickOs,
	PickCount,
}

/// The user's last successfully dispatched request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastRequest {
	pub os_version: String,
	pub num_machines: u8,
	pub username: String,
	pub password: String,
	pub language: String,
	pub requested_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserState {
	pub step: Step,
	pub chosen_os: Option<String>,
	pub language: String,
	pub chat_mode: bool,
	pub last_request: Option<LastRequest>,
	/// Assistant conversation to continue on the next prompt.
	pub conversation_ref: Option<String>,
}

impl UserState {
	fn new(language: &str) -> Self {
		Self {
			step: Step::Idle,
			chosen_os: None,
			language: language.to_string(),
			chat_mode: false,
			last_request: None,
			conversation_ref: None,
		}
	}

	pub fn toggle_language(&mut self) -> &str {
		self.language = if self.language == LANG_VIETNAMESE {
			LANG_ENGLISH.to_string()
		} else {
			LANG_VIETNAMESE.to_string()
		};
		&self.language
	}

	/// Leaves chat mode and the create dialog.
	pub fn back_to_menu(&mut self) {
		self.step = Step::Idle;
		self.chat_mode = false;
	}
}

/// Dialog state keyed by chat id, created on first access.
#[derive(Debug)]
pub struct UserBook {
	default_language: String,
	users: Mutex<HashMap<i64, UserState>>,
}

impl UserBook {
	pub fn new(default_language: impl Into<String>) -> Self {
		Self {
			default_language: default_language.into(),
			users: Mutex::new(HashMap::new()),
		}
	}

	pub fn get(&self, chat_id: i64) -> UserState {
		self.update(chat_id, |state| state.clone())
	}

	pub fn update<R>(&self, chat_id: i64, f: impl FnOnce(&mut UserState) -> R) -> R {
		let mut users = self.users.lock();
		let state = users
			.entry(chat_id)
			.or_insert_with(|| UserState::new(&self.default_language));
		f(state)
	}
}
