//! Reply keyboards, inline pickers and the callback-data grammar.

use rdp_protocol::telegram::{
	InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, ReplyKeyboardMarkup, ReplyKeyboardRemove, ReplyMarkup,
};

pub const BTN_CREATE: &str = "🖥️ Create Windows RDP";
pub const BTN_SESSION: &str = "📌 Session status";
pub const BTN_RESET: &str = "🧹 Reset session";
pub const BTN_ASSISTANT: &str = "💬 Assistant";
pub const BTN_HELP: &str = "❓ Help";
pub const BTN_MENU: &str = "⬅️ Menu";
pub const BTN_CLEAR_CHAT: &str = "🧹 Clear chat";

/// `(button label, value passed to the workflow)`.
pub const OS_OPTIONS: [(&str, &str); 6] = [
	("Windows Server 2025", "Windows Server 2025 (Docker - 4vCPU | 8GB RAM)"),
	("Windows Server 2022", "Windows Server 2022 (Docker - 4vCPU | 8GB RAM)"),
	("Windows Server 2019", "Windows Server 2019 (Docker - 4vCPU | 8GB RAM)"),
	("Windows Server 2012", "Windows Server 2012 (Docker - 4vCPU | 8GB RAM)"),
	("Windows 11 Pro", "Windows 11 Professional (Docker - 4vCPU | 8GB RAM)"),
	("Windows 10 Pro", "Windows 10 Professional (Docker - 4vCPU | 8GB RAM)"),
];

pub const MAX_MACHINES: u8 = 5;

/// Reply-keyboard button pressed by the user, recognized by its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
	Create,
	Session,
	Reset,
	Assistant,
	Help,
	Menu,
	ClearChat,
}

impl Button {
	pub fn from_text(text: &str) -> Option<Self> {
		Some(match text.trim() {
			BTN_CREATE => Button::Create,
			BTN_SESSION => Button::Session,
			BTN_RESET => Button::Reset,
			BTN_ASSISTANT => Button::Assistant,
			BTN_HELP => Button::Help,
			BTN_MENU => Button::Menu,
			BTN_CLEAR_CHAT => Button::ClearChat,
			_ => return None,
		})
	}
}

/// Decoded inline-button payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
	Os(String),
	ToggleLanguage,
	Count(u8),
	BackToOs,
	Create,
	LastSession,
	Reset,
	Help,
}

impl Callback {
	/// Parses `kind|value` payloads and the bare menu tags.
	///
	/// Counts outside `1..=MAX_MACHINES` and OS values not offered by
	/// [`os_picker`] are rejected.
	pub fn parse(data: &str) -> Option<Self> {
		match data.split_once('|') {
			Some(("os", full)) => OS_OPTIONS
				.iter()
				.any(|(_, value)| *value == full)
				.then(|| Callback::Os(full.to_string())),
			Some(("lang", _)) => Some(Callback::ToggleLanguage),
			Some(("count", n)) => n.parse::<u8>().ok().filter(|n| (1..=MAX_MACHINES).contains(n)).map(Callback::Count),
			Some(("nav", "back_to_os")) => Some(Callback::BackToOs),
			Some(_) => None,
			None => match data {
				"create_rdp" => Some(Callback::Create),
				"last_session" => Some(Callback::LastSession),
				"reset_state" => Some(Callback::Reset),
				"help" => Some(Callback::Help),
				_ => None,
			},
		}
	}
}

fn reply_keyboard(labels: &[&str]) -> ReplyMarkup {
	ReplyMarkup::Keyboard(ReplyKeyboardMarkup {
		keyboard: labels
			.chunks(2)
			.map(|row| row.iter().map(|label| KeyboardButton { text: label.to_string() }).collect())
			.collect(),
		resize_keyboard: true,
	})
}

pub fn main_keyboard() -> ReplyMarkup {
	reply_keyboard(&[BTN_CREATE, BTN_SESSION, BTN_RESET, BTN_ASSISTANT, BTN_HELP])
}

pub fn chat_keyboard() -> ReplyMarkup {
	reply_keyboard(&[BTN_MENU, BTN_CLEAR_CHAT])
}

pub fn remove_keyboard() -> ReplyMarkup {
	ReplyMarkup::Remove(ReplyKeyboardRemove { remove_keyboard: true })
}

/// OS choices, two per row, then the language toggle.
pub fn os_picker(language: &str) -> ReplyMarkup {
	let mut rows: Vec<Vec<InlineKeyboardButton>> = OS_OPTIONS
		.chunks(2)
		.map(|pair| {
			pair.iter()
				.map(|(label, full)| InlineKeyboardButton::new(*label, format!("os|{full}")))
				.collect()
		})
		.collect();
	rows.push(vec![InlineKeyboardButton::new(format!("🌐 Language: {language}"), "lang|toggle")]);
	ReplyMarkup::Inline(InlineKeyboardMarkup { inline_keyboard: rows })
}

pub fn count_picker() -> ReplyMarkup {
	let counts = (1..=MAX_MACHINES)
		.map(|n| InlineKeyboardButton::new(n.to_string(), format!("count|{n}")))
		.collect();
	ReplyMarkup::Inline(InlineKeyboardMarkup {
		inline_keyboard: vec![counts, vec![InlineKeyboardButton::new("⬅️ Back", "nav|back_to_os")]],
	})
}

/// Inline main menu. Its tags also match buttons left on messages from older bot versions.
pub fn legacy_menu() -> ReplyMarkup {
	ReplyMarkup::Inline(InlineKeyboardMarkup {
		inline_keyboard: vec![
			vec![
				InlineKeyboardButton::new(BTN_CREATE, "create_rdp"),
				InlineKeyboardButton::new(BTN_SESSION, "last_session"),
			],
			vec![
				InlineKeyboardButton::new(BTN_RESET, "reset_state"),
				InlineKeyboardButton::new(BTN_HELP, "help"),
			],
		],
	})
}
