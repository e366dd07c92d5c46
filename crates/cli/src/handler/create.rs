use rdp::{ChatEvent, GatewayError, JobInputs};
use tracing::{info, warn};

use super::{Handler, keyboards, messages};
use crate::password;
use crate::users::{LastRequest, Step};

/// Account name created on every provisioned machine.
const RDP_USERNAME: &str = "Admin";

impl Handler {
	pub(super) async fn start_create(&self, chat_id: i64) -> Result<(), GatewayError> {
		let language = self.users.update(chat_id, |s| {
			s.step = Step::PickOs;
			s.chat_mode = false;
			s.language.clone()
		});
		self.reply_with(chat_id, messages::create_intro(), &keyboards::remove_keyboard()).await?;
		self.reply_with(chat_id, messages::os_prompt(), &keyboards::os_picker(&language)).await
	}

	/// Runs the cooldown, lock and dispatch chain for the chosen OS.
	pub(super) async fn submit(&self, event: &ChatEvent, count: u8) -> Result<(), GatewayError> {
		let chat_id = event.chat_id;
		let state = self.users.get(chat_id);
		let Some(os_version) = state.chosen_os else {
			return self.reply(chat_id, messages::pick_os_first()).await;
		};

		let request = LastRequest {
			os_version,
			num_machines: count,
			username: RDP_USERNAME.to_string(),
			password: password::generate(),
			language: state.language,
			requested_at: self.clock.now(),
		};
		let caller = chat_id.to_string();

		match self.broker.request(&caller, job_inputs(event, &request)).await {
			Ok(submitted) => {
				info!(
					target = "rdp.bot",
					caller = %caller,
					os = %request.os_version,
					machines = request.num_machines,
					started_at = submitted.lease.started_at,
					"rdp request submitted"
				);
				let text = messages::submitted(&request);
				self.users.update(chat_id, |s| {
					s.step = Step::Idle;
					s.last_request = Some(request);
				});
				self.reply(chat_id, &text).await
			}
			Err(err) => {
				warn!(target = "rdp.bot", caller = %caller, kind = %err.kind(), error = %err, "rdp request refused");
				self.reply(chat_id, &messages::request_failed(&err)).await
			}
		}
	}
}

fn job_inputs(event: &ChatEvent, request: &LastRequest) -> JobInputs {
	JobInputs::from([
		("chat_id".to_string(), event.chat_id.to_string()),
		("requested_by".to_string(), event.sender_id.to_string()),
		("os_version".to_string(), request.os_version.clone()),
		("num_machines".to_string(), request.num_machines.to_string()),
		("language".to_string(), request.language.clone()),
		("username".to_string(), request.username.clone()),
		("password".to_string(), request.password.clone()),
	])
}
