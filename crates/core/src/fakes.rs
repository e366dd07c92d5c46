//! In-process doubles for the executor, gateway and assistant ports.
//!
//! Used by this crate's tests and by the bot's handler tests; none of them
//! touch the network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use rdp_protocol::telegram::ReplyMarkup;

use crate::assistant::{Assistant, Completion};
use crate::dispatch::{JobExecutor, JobRequest, RunProbe};
use crate::error::{AssistantError, ExecutorError, GatewayError};
use crate::gateway::{ChatEvent, ChatGateway, PollBatch};

/// Records dispatched jobs; failure and busy flags are switchable.
#[derive(Debug, Default)]
pub struct FakeExecutor {
	jobs: Mutex<Vec<JobRequest>>,
	fail_dispatch: AtomicBool,
	busy: AtomicBool,
	fail_probe: AtomicBool,
}

impl FakeExecutor {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn jobs(&self) -> Vec<JobRequest> {
		self.jobs.lock().clone()
	}

	pub fn fail_dispatch(&self, fail: bool) {
		self.fail_dispatch.store(fail, Ordering::SeqCst);
	}

	/// Makes the run probe report an in-flight run.
	pub fn set_busy(&self, busy: bool) {
		self.busy.store(busy, Ordering::SeqCst);
	}

	pub fn fail_probe(&self, fail: bool) {
		self.fail_probe.store(fail, Ordering::SeqCst);
	}
}

#[async_trait]
impl JobExecutor for FakeExecutor {
	async fn dispatch(&self, job: &JobRequest) -> Result<(), ExecutorError> {
		if self.fail_dispatch.load(Ordering::SeqCst) {
			return Err(ExecutorError::Rejected {
				status: 422,
				message: "Workflow does not have 'workflow_dispatch' trigger".to_string(),
			});
		}
		self.jobs.lock().push(job.clone());
		Ok(())
	}
}

#[async_trait]
impl RunProbe for FakeExecutor {
	async fn has_active_run(&self) -> Result<bool, ExecutorError> {
		if self.fail_probe.load(Ordering::SeqCst) {
			return Err(ExecutorError::Timeout);
		}
		Ok(self.busy.load(Ordering::SeqCst))
	}
}

/// Outbound call captured by [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
	Message {
		chat_id: i64,
		text: String,
		markup: Option<ReplyMarkup>,
	},
	CallbackAnswer {
		callback_id: String,
		text: Option<String>,
	},
	MarkupEdit {
		chat_id: i64,
		message_id: i64,
		markup: ReplyMarkup,
	},
	Typing {
		chat_id: i64,
	},
}

/// Gateway that replays queued events and records everything sent.
#[derive(Debug, Default)]
pub struct RecordingGateway {
	inbox: Mutex<VecDeque<Result<PollBatch, GatewayError>>>,
	outbox: Mutex<Vec<Outbound>>,
	fail_sends: AtomicBool,
}

impl RecordingGateway {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues one poll result made of `events`.
	pub fn push_events(&self, events: Vec<ChatEvent>) {
		let next_offset = events.iter().map(|e| e.update_id + 1).max();
		self.inbox.lock().push_back(Ok(PollBatch { events, next_offset }));
	}

	pub fn push_poll_error(&self, err: GatewayError) {
		self.inbox.lock().push_back(Err(err));
	}

	pub fn fail_sends(&self, fail: bool) {
		self.fail_sends.store(fail, Ordering::SeqCst);
	}

	pub fn outbound(&self) -> Vec<Outbound> {
		self.outbox.lock().clone()
	}

	/// Texts of every sent message, in order.
	pub fn messages(&self) -> Vec<String> {
		self.outbox
			.lock()
			.iter()
			.filter_map(|out| match out {
				Outbound::Message { text, .. } => Some(text.clone()),
				_ => None,
			})
			.collect()
	}

	pub fn last_message(&self) -> Option<String> {
		self.messages().pop()
	}

	pub fn clear(&self) {
		self.outbox.lock().clear();
	}

	fn record(&self, out: Outbound) -> Result<(), GatewayError> {
		if self.fail_sends.load(Ordering::SeqCst) {
			return Err(GatewayError::Transport("recording gateway is failing sends".to_string()));
		}
		self.outbox.lock().push(out);
		Ok(())
	}
}

#[async_trait]
impl ChatGateway for RecordingGateway {
	async fn poll(&self, offset: Option<i64>, _timeout_secs: u64) -> Result<PollBatch, GatewayError> {
		let next = self.inbox.lock().pop_front();
		match next {
			Some(result) => result,
			None => Ok(PollBatch {
				events: Vec::new(),
				next_offset: offset,
			}),
		}
	}

	async fn send(&self, chat_id: i64, text: &str, markup: Option<&ReplyMarkup>) -> Result<(), GatewayError> {
		self.record(Outbound::Message {
			chat_id,
			text: text.to_string(),
			markup: markup.cloned(),
		})
	}

	async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), GatewayError> {
		self.record(Outbound::CallbackAnswer {
			callback_id: callback_id.to_string(),
			text: text.map(str::to_string),
		})
	}

	async fn edit_markup(&self, chat_id: i64, message_id: i64, markup: &ReplyMarkup) -> Result<(), GatewayError> {
		self.record(Outbound::MarkupEdit {
			chat_id,
			message_id,
			markup: markup.clone(),
		})
	}

	async fn typing(&self, chat_id: i64) -> Result<(), GatewayError> {
		self.record(Outbound::Typing { chat_id })
	}
}

/// Assistant that replays scripted replies and records prompts.
#[derive(Debug, Default)]
pub struct ScriptedAssistant {
	replies: Mutex<VecDeque<Result<Completion, AssistantError>>>,
	prompts: Mutex<Vec<(Option<String>, String)>>,
}

impl ScriptedAssistant {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn reply(&self, text: &str, conversation_ref: &str) {
		self.replies.lock().push_back(Ok(Completion {
			text: text.to_string(),
			conversation_ref: Some(conversation_ref.to_string()),
		}));
	}

	pub fn fail(&self, err: AssistantError) {
		self.replies.lock().push_back(Err(err));
	}

	/// `(conversation_ref, prompt)` pairs received so far.
	pub fn prompts(&self) -> Vec<(Option<String>, String)> {
		self.prompts.lock().clone()
	}
}

#[async_trait]
impl Assistant for ScriptedAssistant {
	async fn complete(&self, conversation_ref: Option<&str>, prompt: &str) -> Result<Completion, AssistantError> {
		self.prompts.lock().push((conversation_ref.map(str::to_string), prompt.to_string()));
		let next = self.replies.lock().pop_front();
		next.unwrap_or(Ok(Completion {
			text: String::new(),
			conversation_ref: conversation_ref.map(str::to_string),
		}))
	}
}
