use async_trait::async_trait;
use rdp::{ExecutorError, JobExecutor, JobRequest, RunProbe};
use rdp_protocol::github::{WorkflowDispatchRequest, WorkflowRunList};
use tracing::debug;

use super::{GithubClient, error_message};
use crate::http::Failure;

/// Runs inspected by the busy probe.
const RUNS_PAGE: &str = "10";

/// Workflow dispatch and run-status probe for one workflow file.
#[derive(Debug, Clone)]
pub struct ActionsExecutor {
	github: GithubClient,
	workflow: String,
}

impl ActionsExecutor {
	pub fn new(github: GithubClient, workflow: impl Into<String>) -> Self {
		Self {
			github,
			workflow: workflow.into(),
		}
	}

	fn workflow_url(&self, workflow: &str, tail: &str) -> String {
		self.github.repo_url(&format!("actions/workflows/{workflow}/{tail}"))
	}
}

fn transport(err: reqwest::Error) -> ExecutorError {
	match Failure::from(err) {
		Failure::Timeout => ExecutorError::Timeout,
		Failure::Transport(message) => ExecutorError::Transport(message),
	}
}

#[async_trait]
impl JobExecutor for ActionsExecutor {
	async fn dispatch(&self, job: &JobRequest) -> Result<(), ExecutorError> {
		let body = WorkflowDispatchRequest {
			git_ref: job.git_ref.clone(),
			inputs: job.inputs.clone(),
		};
		let response = self
			.github
			.http
			.post(self.workflow_url(&job.workflow, "dispatches"))
			.json(&body)
			.send()
			.await
			.map_err(transport)?;

		let status = response.status();
		if !status.is_success() {
			return Err(ExecutorError::Rejected {
				status: status.as_u16(),
				message: error_message(response).await,
			});
		}
		debug!(target = "rdp.dispatch", workflow = %job.workflow, status = status.as_u16(), "dispatch accepted");
		Ok(())
	}
}

#[async_trait]
impl RunProbe for ActionsExecutor {
	async fn has_active_run(&self) -> Result<bool, ExecutorError> {
		let response = self
			.github
			.http
			.get(self.workflow_url(&self.workflow, "runs"))
			.query(&[("per_page", RUNS_PAGE)])
			.send()
			.await
			.map_err(transport)?;

		let status = response.status();
		if !status.is_success() {
			return Err(ExecutorError::Rejected {
				status: status.as_u16(),
				message: error_message(response).await,
			});
		}

		let runs: WorkflowRunList = response
			.json()
			.await
			.map_err(|err| ExecutorError::Transport(err.without_url().to_string()))?;
		let busy = runs.has_pending();
		debug!(target = "rdp.dispatch", workflow = %self.workflow, runs = runs.workflow_runs.len(), busy, "run status probed");
		Ok(busy)
	}
}
