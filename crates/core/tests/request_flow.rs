//! End-to-end request/query/reset flow through the session broker.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use rdp::{
	CooldownGate, Denial, DispatchTarget, ErrorKind, ExecutorError, JobExecutor, JobInputs, JobRequest, LockManager,
	ManualClock, MemoryStore, RequestError, SessionBroker, SessionDocument, SessionStatus,
};

/// Records accepted jobs; rejects everything while `fail` is set.
#[derive(Default)]
struct Executor {
	jobs: Mutex<Vec<JobRequest>>,
	fail: AtomicBool,
}

impl Executor {
	fn jobs(&self) -> Vec<JobRequest> {
		self.jobs.lock().clone()
	}

	fn fail_dispatch(&self, fail: bool) {
		self.fail.store(fail, Ordering::SeqCst);
	}
}

#[async_trait]
impl JobExecutor for Executor {
	async fn dispatch(&self, job: &JobRequest) -> Result<(), ExecutorError> {
		if self.fail.load(Ordering::SeqCst) {
			return Err(ExecutorError::Rejected {
				status: 422,
				message: "Workflow does not have 'workflow_dispatch' trigger".to_string(),
			});
		}
		self.jobs.lock().push(job.clone());
		Ok(())
	}
}

struct World {
	store: Arc<MemoryStore<SessionDocument>>,
	executor: Arc<Executor>,
	clock: Arc<ManualClock>,
	broker: SessionBroker,
}

fn world() -> World {
	let store = Arc::new(MemoryStore::new());
	let executor = Arc::new(Executor::default());
	let clock = Arc::new(ManualClock::new(1_700_000_000));
	let lock = LockManager::new(store.clone(), clock.clone());
	let broker = SessionBroker::new(
		lock,
		executor.clone(),
		CooldownGate::new(60, clock.clone()),
		DispatchTarget::new("WindowsRDP.yml", "main"),
	);
	World {
		store,
		executor,
		clock,
		broker,
	}
}

fn inputs(caller: &str) -> JobInputs {
	JobInputs::from([
		("chat_id".to_string(), caller.to_string()),
		("num_machines".to_string(), "1".to_string()),
	])
}

#[tokio::test]
async fn two_users_contend_for_one_session() -> anyhow::Result<()> {
	let w = world();

	let submitted = w.broker.request("u1", inputs("u1")).await?;
	assert_eq!(submitted.lease.owner, "u1");
	assert_eq!(submitted.job.workflow, "WindowsRDP.yml");
	let doc = w.broker.query().await?;
	assert_eq!((doc.status.clone(), doc.owner()), (SessionStatus::Queued, Some("u1")));

	let err = w.broker.request("u2", inputs("u2")).await.unwrap_err();
	match err {
		RequestError::Lock(lock) => assert_eq!(
			lock.denial(),
			Some(&Denial::AlreadyActive {
				owner: Some("u1".into()),
				status: SessionStatus::Queued,
			})
		),
		other => panic!("unexpected error: {other}"),
	}

	let err = w.broker.reset("u2").await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::NotOwner);
	assert_eq!(w.broker.query().await?, doc);

	w.clock.advance(5);
	let released = w.broker.reset("u1").await?;
	assert_eq!(released.owner.as_deref(), Some("u1"));

	let doc = w.broker.query().await?;
	assert_eq!(doc.status, SessionStatus::Stopped);
	assert_eq!(doc.updated_at, Some(1_700_000_005));
	assert_eq!(w.executor.jobs().len(), 1);
	Ok(())
}

#[tokio::test]
async fn workflow_transition_to_running_still_blocks_requests() -> anyhow::Result<()> {
	let w = world();
	w.broker.request("u1", inputs("u1")).await?;

	let mut running = w.broker.query().await?;
	running.status = SessionStatus::Running;
	running.endpoint = Some("1.2.3.4:3389".into());
	w.store.put(running);

	w.clock.advance(120);
	let err = w.broker.request("u1", inputs("u1")).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::AlreadyActive);

	let mut done = w.broker.query().await?;
	done.status = SessionStatus::Completed;
	w.store.put(done);
	w.clock.advance(120);
	w.broker.request("u2", inputs("u2")).await?;
	assert_eq!(w.broker.query().await?.owner(), Some("u2"));
	Ok(())
}

#[tokio::test]
async fn dispatch_failure_leaves_session_free_for_the_next_caller() -> anyhow::Result<()> {
	let w = world();
	w.executor.fail_dispatch(true);

	let err = w.broker.request("u1", inputs("u1")).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::DispatchFailed);
	assert_eq!(w.broker.query().await?.status, SessionStatus::Stopped);

	w.executor.fail_dispatch(false);
	w.broker.request("u2", inputs("u2")).await?;
	assert_eq!(w.broker.query().await?.owner(), Some("u2"));
	Ok(())
}

#[tokio::test]
async fn store_outage_surfaces_as_unavailable() {
	let w = world();
	w.store.set_offline(true);

	let err = w.broker.request("u1", inputs("u1")).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
	assert_eq!(w.broker.query().await.unwrap_err().kind(), ErrorKind::StoreUnavailable);
	assert_eq!(w.broker.reset("u1").await.unwrap_err().kind(), ErrorKind::StoreUnavailable);
	assert!(w.executor.jobs().is_empty());
}
