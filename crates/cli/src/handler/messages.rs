//! HTML message bodies sent to chats.

use std::fmt::Write as _;

use rdp::{AssistantError, Denial, LockError, Released, RequestError, SessionDocument};

use crate::users::LastRequest;

/// Telegram rejects messages longer than 4096 characters.
const MAX_MESSAGE_CHARS: usize = 4000;

pub fn esc_html(s: &str) -> String {
	s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Coarse relative age, e.g. `3m ago`.
pub fn ago(now: u64, then: u64) -> String {
	let secs = now.saturating_sub(then);
	match secs {
		0..60 => format!("{secs}s ago"),
		60..3600 => format!("{}m ago", secs / 60),
		3600..86400 => format!("{}h {}m ago", secs / 3600, secs % 3600 / 60),
		_ => format!("{}d ago", secs / 86400),
	}
}

pub fn welcome(name: &str) -> String {
	let name = if name.trim().is_empty() { "there" } else { name };
	format!(
		"👋 Hey <b>{}</b>!\n\n\
		 I can request a temporary <b>Windows RDP</b> machine for you and, if enabled, chat as an assistant.\n\n\
		 Only one session runs at a time. Pick a button below 👇",
		esc_html(name)
	)
}

pub fn help(cooldown_secs: u64) -> String {
	format!(
		"❓ <b>Quick guide</b>\n\n\
		 🖥️ <b>Create Windows RDP</b>\n\
		 • Pick an OS and the number of machines\n\
		 • The bot starts the workflow, which messages you the address when the machine is up\n\
		 • One session at a time; requests are limited to one every {cooldown_secs}s\n\n\
		 📌 <b>Session status</b> shows the shared session and your last request.\n\
		 🧹 <b>Reset session</b> stops the session you own.\n\
		 💬 <b>Assistant</b> relays your messages to the assistant until you press ⬅️ Menu.\n\n\
		 Commands: /start /menu /status /reset /help"
	)
}

pub fn create_intro() -> &'static str {
	"🖥️ <b>Create Windows RDP</b>\n\n\
	 1) Pick the Windows edition\n\
	 2) Pick the number of machines\n\
	 3) The workflow messages you the public address once it is ready."
}

pub fn os_prompt() -> &'static str {
	"🧩 <b>Choose an operating system:</b>"
}

pub fn os_chosen(os: &str) -> String {
	format!("✅ OS: <b>{}</b>\n\nNow choose the <b>number of machines</b>:", esc_html(os))
}

pub fn submitted(request: &LastRequest) -> String {
	format!(
		"🚀 <b>RDP request sent!</b>\n\n\
		 🪟 OS: <b>{}</b>\n\
		 🧱 Machines: <b>{}</b>\n\
		 👤 User: <code>{}</code>\n\
		 🔐 Pass: <code>{}</code>\n\
		 🌐 Language: <b>{}</b>\n\n\
		 ⏳ Give it a few minutes. The workflow messages you directly when the address is ready.",
		esc_html(&request.os_version),
		request.num_machines,
		esc_html(&request.username),
		esc_html(&request.password),
		esc_html(&request.language),
	)
}

pub fn denial(denial: &Denial) -> String {
	match denial {
		Denial::AlreadyActive { owner, status } => {
			let owner = owner.as_deref().map(|o| format!(" (owner <code>{}</code>)", esc_html(o))).unwrap_or_default();
			format!("⛔ A session is already <b>{status}</b>{owner}. Wait for it to finish or ask the owner to reset it.")
		}
		Denial::WorkflowBusy => "⛔ A workflow run is still queued or running. Wait for it to finish, then try again.".to_string(),
		Denial::RaceLost => "⚠️ Someone else requested a session at the same moment and got it first. Check /status.".to_string(),
		Denial::NotOwner { owner } => format!(
			"⛔ The session belongs to <code>{}</code>. Only the owner can reset it.",
			esc_html(owner)
		),
	}
}

pub fn lock_failed(err: &LockError) -> String {
	match err {
		LockError::Denied(d) => denial(d),
		LockError::StoreUnavailable(_) | LockError::ProbeUnavailable(_) => format!(
			"⚠️ Could not reach the session state right now. Try again in a moment.\n<code>{}</code>",
			esc_html(&err.to_string())
		),
	}
}

pub fn request_failed(err: &RequestError) -> String {
	match err {
		RequestError::CoolingDown { retry_after } => format!("⏳ You are going too fast. Try again in {retry_after}s."),
		RequestError::Lock(err) => lock_failed(err),
		RequestError::DispatchFailed(source) => format!(
			"❌ Starting the workflow failed, the session was released. Try again later.\n<code>{}</code>",
			esc_html(&source.to_string())
		),
		RequestError::CompensationFailed { dispatch, .. } => format!(
			"❌ Starting the workflow failed and the session could not be released.\n\
			 The session stays <b>queued</b> until an admin resets it.\n<code>{}</code>",
			esc_html(&dispatch.to_string())
		),
	}
}

/// Shared session state followed by the viewer's last request.
pub fn status(doc: &SessionDocument, last: Option<&LastRequest>, viewer: &str, now: u64) -> String {
	let mut out = String::from("📌 <b>Session</b>\n\n");
	let _ = writeln!(out, "Status: <b>{}</b>", esc_html(doc.status.as_str()));
	if let Some(owner) = doc.owner() {
		let yours = if owner == viewer { " (you)" } else { "" };
		let _ = writeln!(out, "Owner: <code>{}</code>{yours}", esc_html(owner));
	}
	if let Some(started) = doc.started_at {
		let _ = writeln!(out, "Started: {}", ago(now, started));
	}
	if let Some(updated) = doc.updated_at {
		let _ = writeln!(out, "Updated: {}", ago(now, updated));
	}
	if let Some(endpoint) = &doc.endpoint {
		let _ = writeln!(out, "Address: <code>{}</code>", esc_html(endpoint));
	}
	if let Some(web) = &doc.web {
		let _ = writeln!(out, "Web: {}", esc_html(web));
	}
	if doc.owner() == Some(viewer) {
		if let Some(username) = &doc.username {
			let _ = writeln!(out, "User: <code>{}</code>", esc_html(username));
		}
		if let Some(password) = &doc.password {
			let _ = writeln!(out, "Pass: <code>{}</code>", esc_html(password));
		}
	}
	if let Some(note) = &doc.note {
		let _ = writeln!(out, "Note: <i>{}</i>", esc_html(note));
	}

	match last {
		None => out.push_str("\n📭 You have not requested a session yet."),
		Some(last) => {
			let _ = write!(
				out,
				"\n🗂 <b>Your last request</b> ({})\n\
				 🪟 {} × {}\n\
				 👤 <code>{}</code> 🔐 <code>{}</code>\n\
				 🌐 {}",
				ago(now, last.requested_at),
				esc_html(&last.os_version),
				last.num_machines,
				esc_html(&last.username),
				esc_html(&last.password),
				esc_html(&last.language),
			);
		}
	}
	out
}

pub fn reset_done(released: &Released) -> String {
	if released.previous.is_active() {
		"✅ Session stopped. You can create a new one now.".to_string()
	} else {
		format!("✅ No session was active (it was <b>{}</b>). You can create a new one now.", esc_html(released.previous.as_str()))
	}
}

pub fn assistant_on() -> &'static str {
	"💬 <b>Assistant mode: ON</b>\n\nSend messages as usual and I will answer. Press <b>⬅️ Menu</b> to leave."
}

pub fn assistant_disabled() -> &'static str {
	"⚠️ <b>The assistant is not enabled.</b>\n\nSet <code>OPENAI_API_KEY</code> for the bot to turn it on."
}

pub fn assistant_cleared() -> &'static str {
	"🧹 Conversation cleared."
}

/// Escaped and truncated reply; blank output gets a fallback line.
pub fn assistant_reply(text: &str) -> String {
	let text = text.trim();
	if text.is_empty() {
		return "🤖 I came up empty on that one. Could you say it again?".to_string();
	}
	let truncated: String = text.chars().take(MAX_MESSAGE_CHARS).collect();
	let mut out = esc_html(&truncated);
	if truncated.len() < text.len() {
		out.push('…');
	}
	out
}

pub fn assistant_failed(err: &AssistantError) -> String {
	format!("❌ Assistant error: <code>{}</code>", esc_html(&err.to_string()))
}

pub fn unknown_input() -> &'static str {
	"👀 I did not get that. Use the menu buttons below 👇"
}

pub fn pick_os_first() -> &'static str {
	"Pick an OS first!"
}
