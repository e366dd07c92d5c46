//! Contents store and Actions executor against a fake GitHub REST server.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use parking_lot::Mutex;
use rdp::{
	ExecutorError, JobExecutor, JobInputs, JobRequest, LockManager, ManualClock, RunProbe, SessionDocument,
	SessionStatus, StoreError, Version, VersionedStore, WriteOutcome,
};
use rdp_runtime::github::{ActionsExecutor, ContentsStore, GithubClient};
use serde_json::{Value, json};

const CONTENTS: &str = "/repos/octo/rdp/contents/rdp_state.json";
const DISPATCH: &str = "/repos/octo/rdp/actions/workflows/WindowsRDP.yml/dispatches";
const RUNS: &str = "/repos/octo/rdp/actions/workflows/WindowsRDP.yml/runs";

#[derive(Default)]
struct FakeGithub {
	file: Mutex<Option<(String, Vec<u8>)>>,
	next_sha: Mutex<u64>,
	commit_messages: Mutex<Vec<String>>,
	dispatches: Mutex<Vec<Value>>,
	reject_dispatch: Mutex<bool>,
	run_statuses: Mutex<Vec<&'static str>>,
	runs_query: Mutex<Option<String>>,
	auth_headers: Mutex<Vec<String>>,
}

impl FakeGithub {
	fn seed(&self, body: &str) -> String {
		let sha = self.bump();
		*self.file.lock() = Some((sha.clone(), body.as_bytes().to_vec()));
		sha
	}

	fn bump(&self) -> String {
		let mut next = self.next_sha.lock();
		*next += 1;
		format!("sha{next}")
	}

	fn body(&self) -> Option<Value> {
		self.file
			.lock()
			.as_ref()
			.map(|(_, bytes)| serde_json::from_slice(bytes).unwrap())
	}
}

fn message(status: StatusCode, text: &str) -> Response {
	(status, Json(json!({ "message": text, "documentation_url": "https://docs.github.com" }))).into_response()
}

async fn get_contents(State(gh): State<Arc<FakeGithub>>, headers: axum::http::HeaderMap) -> Response {
	if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
		gh.auth_headers.lock().push(auth.to_string());
	}
	let file = gh.file.lock().clone();
	match file {
		None => message(StatusCode::NOT_FOUND, "Not Found"),
		Some((sha, bytes)) => {
			let encoded = STANDARD.encode(bytes);
			let wrapped: Vec<String> = encoded
				.as_bytes()
				.chunks(60)
				.map(|chunk| String::from_utf8(chunk.to_vec()).unwrap())
				.collect();
			Json(json!({
				"type": "file",
				"encoding": "base64",
				"sha": sha,
				"content": wrapped.join("\n") + "\n",
			}))
			.into_response()
		}
	}
}

async fn put_contents(State(gh): State<Arc<FakeGithub>>, Json(body): Json<Value>) -> Response {
	let current = gh.file.lock().as_ref().map(|(sha, _)| sha.clone());
	let supplied = body["sha"].as_str().map(str::to_string);
	match (&current, &supplied) {
		(Some(_), None) => return message(StatusCode::UNPROCESSABLE_ENTITY, "Invalid request.\n\n\"sha\" wasn't supplied."),
		(Some(current), Some(supplied)) if current != supplied => {
			return message(StatusCode::CONFLICT, "rdp_state.json does not match");
		}
		(None, Some(_)) => return message(StatusCode::CONFLICT, "rdp_state.json does not match"),
		_ => {}
	}

	let bytes = STANDARD.decode(body["content"].as_str().unwrap()).unwrap();
	let sha = gh.bump();
	*gh.file.lock() = Some((sha.clone(), bytes));
	gh.commit_messages.lock().push(body["message"].as_str().unwrap().to_string());
	let status = if current.is_some() { StatusCode::OK } else { StatusCode::CREATED };
	(
		status,
		Json(json!({ "content": { "sha": sha, "path": "rdp_state.json" }, "commit": { "sha": "c0ffee" } })),
	)
		.into_response()
}

async fn dispatch(State(gh): State<Arc<FakeGithub>>, Json(body): Json<Value>) -> Response {
	if *gh.reject_dispatch.lock() {
		return message(StatusCode::UNPROCESSABLE_ENTITY, "Workflow does not have 'workflow_dispatch' trigger");
	}
	gh.dispatches.lock().push(body);
	StatusCode::NO_CONTENT.into_response()
}

async fn runs(State(gh): State<Arc<FakeGithub>>, Query(query): Query<Vec<(String, String)>>) -> Response {
	*gh.runs_query.lock() = query.iter().find(|(k, _)| k == "per_page").map(|(_, v)| v.clone());
	let runs: Vec<Value> = gh
		.run_statuses
		.lock()
		.iter()
		.enumerate()
		.map(|(i, status)| json!({ "id": i + 1, "status": status, "conclusion": null }))
		.collect();
	Json(json!({ "total_count": runs.len(), "workflow_runs": runs })).into_response()
}

async fn serve(router: Router) -> String {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move {
		axum::serve(listener, router).await.unwrap();
	});
	format!("http://{addr}")
}

async fn fake_github() -> (Arc<FakeGithub>, GithubClient) {
	let gh = Arc::new(FakeGithub::default());
	let router = Router::new()
		.route(CONTENTS, get(get_contents).put(put_contents))
		.route(DISPATCH, post(dispatch))
		.route(RUNS, get(runs))
		.with_state(gh.clone());
	let base = serve(router).await;
	let client = GithubClient::new("ghp_test", "octo/rdp", &base, Duration::from_secs(5)).unwrap();
	(gh, client)
}

#[tokio::test]
async fn absent_document_reads_as_none() {
	let (_, client) = fake_github().await;
	let store = ContentsStore::new(client, "rdp_state.json");
	assert!(store.read().await.unwrap().is_none());
}

#[tokio::test]
async fn read_decodes_wrapped_base64_and_sends_token() {
	let (gh, client) = fake_github().await;
	let sha = gh.seed(r#"{"status": "running", "owner_chat_id": 42, "endpoint": "1.2.3.4:3389"}"#);
	let store = ContentsStore::new(client, "rdp_state.json");

	let read = store.read().await.unwrap().unwrap();
	assert_eq!(read.version, Version::new(sha));
	assert_eq!(read.value.status, SessionStatus::Running);
	assert_eq!(read.value.owner(), Some("42"));
	assert_eq!(gh.auth_headers.lock().as_slice(), ["Bearer ghp_test"]);
}

#[tokio::test]
async fn blank_file_reads_as_free_document_with_its_sha() {
	let (gh, client) = fake_github().await;
	let sha = gh.seed("  \n");
	let read = ContentsStore::new(client, "rdp_state.json").read().await.unwrap().unwrap();
	assert_eq!(read.value, SessionDocument::default());
	assert_eq!(read.version, Version::new(sha));
}

#[tokio::test]
async fn invalid_json_is_malformed() {
	let (gh, client) = fake_github().await;
	gh.seed("{not json");
	let err = ContentsStore::new(client, "rdp_state.json").read().await.unwrap_err();
	assert!(matches!(err, StoreError::Malformed(_)));
}

#[tokio::test]
async fn write_commits_pretty_json_and_returns_new_sha() {
	let (gh, client) = fake_github().await;
	let store = ContentsStore::new(client, "rdp_state.json");

	let outcome = store.write(&SessionDocument::queued("7", 100), None, "Queue RDP session").await.unwrap();
	let version = match outcome {
		WriteOutcome::Committed(version) => version,
		WriteOutcome::Conflict => panic!("expected a commit"),
	};

	let (sha, bytes) = gh.file.lock().clone().unwrap();
	assert_eq!(version.as_str(), sha);
	let text = String::from_utf8(bytes).unwrap();
	assert!(text.starts_with("{\n  \"status\": \"queued\""));
	assert!(text.ends_with("}\n"));
	assert_eq!(gh.commit_messages.lock().as_slice(), ["Queue RDP session"]);
}

#[tokio::test]
async fn stale_sha_and_blind_create_are_conflicts() {
	let (gh, client) = fake_github().await;
	gh.seed(r#"{"status": "stopped"}"#);
	let store = ContentsStore::new(client, "rdp_state.json");
	let doc = SessionDocument::queued("7", 1);

	let stale = Version::new("sha-from-an-older-read");
	assert_eq!(store.write(&doc, Some(&stale), "x").await.unwrap(), WriteOutcome::Conflict);
	assert_eq!(store.write(&doc, None, "x").await.unwrap(), WriteOutcome::Conflict);
	assert_eq!(gh.body().unwrap()["status"], "stopped");
}

#[tokio::test]
async fn lock_manager_round_trip_over_contents_api() {
	let (gh, client) = fake_github().await;
	let store = Arc::new(ContentsStore::new(client, "rdp_state.json"));
	let lock = LockManager::new(store, Arc::new(ManualClock::new(1_700_000_000)));

	lock.acquire("11").await.unwrap();
	assert_eq!(gh.body().unwrap()["owner_chat_id"], "11");

	let err = lock.acquire("22").await.unwrap_err();
	assert_eq!(err.kind().as_str(), "already_active");

	lock.release("11", rdp::ReleaseMode::OwnerOnly, None).await.unwrap();
	assert_eq!(gh.body().unwrap()["status"], "stopped");
	assert_eq!(
		gh.commit_messages.lock().as_slice(),
		["Queue RDP session", "Reset RDP state"]
	);
}

#[tokio::test]
async fn null_status_document_is_free_and_can_be_reset() {
	let (gh, client) = fake_github().await;
	gh.seed(r#"{"status": null, "owner_chat_id": "7"}"#);
	let store = Arc::new(ContentsStore::new(client, "rdp_state.json"));
	let lock = LockManager::new(store.clone(), Arc::new(ManualClock::new(1_700_000_000)));

	let released = lock
		.release("admin", rdp::ReleaseMode::Forced, Some("reset by telegram"))
		.await
		.unwrap();
	assert_eq!(released.previous, SessionStatus::Stopped);
	assert_eq!(released.owner.as_deref(), Some("7"));
	assert_eq!(gh.body().unwrap()["status"], "stopped");

	gh.seed(r#"{"status": 3}"#);
	assert!(!store.read().await.unwrap().unwrap().value.is_active());
	lock.acquire("11").await.unwrap();
	assert_eq!(gh.body().unwrap()["owner_chat_id"], "11");
}

#[tokio::test]
async fn server_error_is_rejected_with_message() {
	let router = Router::new().route(
		CONTENTS,
		get(|| async { message(StatusCode::INTERNAL_SERVER_ERROR, "Server Error") }),
	);
	let base = serve(router).await;
	let client = GithubClient::new("t", "octo/rdp", &base, Duration::from_secs(5)).unwrap();

	let err = ContentsStore::new(client, "rdp_state.json").read().await.unwrap_err();
	match err {
		StoreError::Rejected { status, message } => {
			assert_eq!(status, 500);
			assert_eq!(message, "Server Error");
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[tokio::test]
async fn slow_store_times_out() {
	let router = Router::new().route(
		CONTENTS,
		get(|| async {
			tokio::time::sleep(Duration::from_secs(5)).await;
			StatusCode::OK
		}),
	);
	let base = serve(router).await;
	let client = GithubClient::new("t", "octo/rdp", &base, Duration::from_millis(200)).unwrap();

	let err = ContentsStore::new(client, "rdp_state.json").read().await.unwrap_err();
	assert!(matches!(err, StoreError::Timeout));
}

#[tokio::test]
async fn dispatch_posts_ref_and_inputs() {
	let (gh, client) = fake_github().await;
	let executor = ActionsExecutor::new(client, "WindowsRDP.yml");
	let job = JobRequest {
		workflow: "WindowsRDP.yml".into(),
		git_ref: "main".into(),
		inputs: JobInputs::from([
			("chat_id".to_string(), "42".to_string()),
			("num_machines".to_string(), "2".to_string()),
		]),
	};

	executor.dispatch(&job).await.unwrap();
	assert_eq!(
		gh.dispatches.lock().as_slice(),
		[json!({ "ref": "main", "inputs": { "chat_id": "42", "num_machines": "2" } })]
	);
}

#[tokio::test]
async fn rejected_dispatch_carries_status() {
	let (gh, client) = fake_github().await;
	*gh.reject_dispatch.lock() = true;
	let executor = ActionsExecutor::new(client, "WindowsRDP.yml");
	let job = JobRequest {
		workflow: "WindowsRDP.yml".into(),
		git_ref: "main".into(),
		inputs: JobInputs::new(),
	};

	let err = executor.dispatch(&job).await.unwrap_err();
	assert!(matches!(err, ExecutorError::Rejected { status: 422, .. }));
}

#[tokio::test]
async fn probe_reports_pending_runs() {
	let (gh, client) = fake_github().await;
	let executor = ActionsExecutor::new(client, "WindowsRDP.yml");

	*gh.run_statuses.lock() = vec!["completed", "completed"];
	assert!(!executor.has_active_run().await.unwrap());
	assert_eq!(gh.runs_query.lock().as_deref(), Some("10"));

	*gh.run_statuses.lock() = vec!["completed", "in_progress"];
	assert!(executor.has_active_run().await.unwrap());

	*gh.run_statuses.lock() = vec!["queued"];
	assert!(executor.has_active_run().await.unwrap());
}
