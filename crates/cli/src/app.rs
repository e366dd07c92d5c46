//! Wires the runtime adapters into the broker and the chat handler.

use std::sync::Arc;

use rdp::{
	Assistant, ChatGateway, Clock, CooldownGate, DispatchTarget, LockManager, SessionBroker, SystemClock,
};
use rdp_runtime::github::{ActionsExecutor, ContentsStore, GithubClient};
use rdp_runtime::openai::ResponsesAssistant;
use rdp_runtime::telegram::TelegramGateway;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::handler::Handler;
use crate::output::EffectiveConfig;
use crate::users::UserBook;

/// Session broker backed by the GitHub repository named in the config.
pub fn broker(config: &Config, clock: Arc<dyn Clock>) -> Result<SessionBroker> {
	let github = GithubClient::new(&config.github_token, &config.repository, &config.github_api_url, config.http_timeout)?;
	let store = ContentsStore::new(github.clone(), &config.state_path).on_branch(&config.workflow_ref);
	let actions = Arc::new(ActionsExecutor::new(github, &config.workflow_file));
	debug!(target = "rdp.bot", repository = %config.repository, path = store.path(), "state store configured");

	let lock = LockManager::new(Arc::new(store), clock.clone()).with_probe(actions.clone());
	Ok(SessionBroker::new(
		lock,
		actions,
		CooldownGate::new(config.cooldown_secs, clock),
		DispatchTarget::new(&config.workflow_file, &config.workflow_ref),
	))
}

pub fn assistant(config: &Config) -> Result<Option<Arc<dyn Assistant>>> {
	let Some(settings) = &config.assistant else {
		info!(target = "rdp.bot", "assistant disabled: OPENAI_API_KEY not set");
		return Ok(None);
	};
	let assistant = ResponsesAssistant::new(&settings.api_key, &settings.api_url, &settings.model, config.http_timeout)?;
	info!(target = "rdp.bot", model = assistant.model(), "assistant enabled");
	Ok(Some(Arc::new(assistant)))
}

/// Handler plus the gateway it replies through.
pub fn handler(config: &Config) -> Result<(Handler, Arc<dyn ChatGateway>)> {
	let clock: Arc<dyn Clock> = Arc::new(SystemClock);
	let broker = Arc::new(broker(config, clock.clone())?);
	let gateway: Arc<dyn ChatGateway> = Arc::new(TelegramGateway::new(
		config.telegram_token()?,
		&config.telegram_api_url,
		config.http_timeout,
	)?);

	let handler = Handler::new(broker, gateway.clone(), UserBook::new(&config.default_language), clock)
		.with_assistant(assistant(config)?)
		.with_admins(config.admins.clone());
	Ok((handler, gateway))
}

pub fn effective_config(config: &Config) -> EffectiveConfig {
	EffectiveConfig {
		repository: config.repository.clone(),
		state_path: config.state_path.clone(),
		workflow: config.workflow_file.clone(),
		workflow_ref: config.workflow_ref.clone(),
	}
}
