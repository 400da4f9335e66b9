#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use uuid::Uuid;

use codeforge::auth::Claims;
use codeforge::config::Config;
use codeforge::db::{
    NewSubmission, NewTestCaseResult, Submission, SubmissionStore, SubmissionWithTestCases,
    TestCaseResult,
};
use codeforge::judge::{Judge0Client, JudgeSettings};
use codeforge::state::AppState;

pub const JWT_SECRET: &str = "integration-test-secret";

pub mod routes {
    pub const EXECUTE: &str = "/api/v1/execute-code";
    pub const ALL_SUBMISSIONS: &str = "/api/v1/submission/get-all-submissions";
    pub const SOLVED: &str = "/api/v1/problems/get-solved-problems";

    pub fn problem_submissions(problem_id: &str) -> String {
        format!("/api/v1/submission/get-submission/{problem_id}")
    }

    pub fn problem_submission_count(problem_id: &str) -> String {
        format!("/api/v1/submission/get-submissions-count/{problem_id}")
    }
}

/// How the mock judge treats submitted programs.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Prints stdin back.
    Echo,
    /// Echoes, except for the given stdin where it prints garbage.
    WrongOn(String),
    /// Every run fails to compile.
    CompileError,
    /// Runs stay queued forever.
    Stuck,
    /// Batch creation answers 503.
    Unavailable,
    /// Every run is refused with a validation error instead of a token.
    RejectLanguage,
}

struct MockRun {
    stdin: String,
    pending_polls: u32,
}

/// In-process stand-in for a Judge0 instance.
pub struct MockJudge {
    behavior: Behavior,
    /// Polls answered with "Processing" before a run finishes.
    pending_polls: u32,
    runs: Mutex<HashMap<String, MockRun>>,
    pub submits: AtomicUsize,
    pub polls: AtomicUsize,
    pub poll_queries: Mutex<Vec<HashMap<String, String>>>,
    pub submit_queries: Mutex<Vec<HashMap<String, String>>>,
    pub submitted: Mutex<Vec<Value>>,
    pub auth_headers: Mutex<Vec<String>>,
}

impl MockJudge {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            pending_polls: 2,
            runs: Mutex::new(HashMap::new()),
            submits: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            poll_queries: Mutex::new(Vec::new()),
            submit_queries: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            auth_headers: Mutex::new(Vec::new()),
        })
    }

    pub fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    /// Serves the mock on an ephemeral port and returns its base URL.
    pub async fn serve(self: &Arc<Self>) -> String {
        let router = Router::new()
            .route("/submissions/batch", get(poll_batch).post(create_batch))
            .with_state(self.clone());
        format!("http://{}", serve(router).await)
    }

    fn finished_run(&self, token: &str, stdin: &str) -> Value {
        match &self.behavior {
            Behavior::CompileError => json!({
                "token": token,
                "stdout": null,
                "stderr": null,
                "compile_output": "  File \"script.py\", line 1\nSyntaxError: invalid syntax",
                "message": "Exit code 1",
                "time": null,
                "memory": null,
                "status": {"id": 6, "description": "Compilation Error"}
            }),
            Behavior::WrongOn(bad) if bad == stdin => json!({
                "token": token,
                "stdout": "garbage\n",
                "stderr": null,
                "compile_output": null,
                "message": null,
                "time": "0.021",
                "memory": 3400,
                "status": {"id": 3, "description": "Accepted"}
            }),
            _ => json!({
                "token": token,
                "stdout": format!("{stdin}\n"),
                "stderr": null,
                "compile_output": null,
                "message": null,
                "time": "0.018",
                "memory": 3312,
                "status": {"id": 3, "description": "Accepted"}
            }),
        }
    }
}

fn record_auth(judge: &MockJudge, headers: &HeaderMap) {
    if let Some(value) = headers.get("x-auth-token").and_then(|v| v.to_str().ok()) {
        judge.auth_headers.lock().unwrap().push(value.to_string());
    }
}

async fn create_batch(
    State(judge): State<Arc<MockJudge>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    judge.submits.fetch_add(1, Ordering::SeqCst);
    judge.submit_queries.lock().unwrap().push(query);
    record_auth(&judge, &headers);

    let submissions = body["submissions"].as_array().cloned().unwrap_or_default();
    judge.submitted.lock().unwrap().extend(submissions.iter().cloned());

    match judge.behavior {
        Behavior::Unavailable => {
            return (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response()
        }
        Behavior::RejectLanguage => {
            let entries: Vec<Value> = submissions
                .iter()
                .map(|_| json!({"language_id": ["language with id 9999 doesn't exist"]}))
                .collect();
            return (StatusCode::CREATED, Json(entries)).into_response();
        }
        _ => {}
    }

    let mut runs = judge.runs.lock().unwrap();
    let tokens: Vec<Value> = submissions
        .iter()
        .map(|submission| {
            let token = Uuid::new_v4().to_string();
            runs.insert(
                token.clone(),
                MockRun {
                    stdin: submission["stdin"].as_str().unwrap_or_default().to_string(),
                    pending_polls: judge.pending_polls,
                },
            );
            json!({ "token": token })
        })
        .collect();

    (StatusCode::CREATED, Json(tokens)).into_response()
}

async fn poll_batch(
    State(judge): State<Arc<MockJudge>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    judge.polls.fetch_add(1, Ordering::SeqCst);
    record_auth(&judge, &headers);
    let tokens = query.get("tokens").cloned().unwrap_or_default();
    judge.poll_queries.lock().unwrap().push(query);

    let stuck = matches!(judge.behavior, Behavior::Stuck);
    let mut runs = judge.runs.lock().unwrap();
    let mut results: Vec<Value> = tokens
        .split(',')
        .map(|token| match runs.get_mut(token) {
            None => Value::Null,
            Some(run) if stuck || run.pending_polls > 0 => {
                run.pending_polls = run.pending_polls.saturating_sub(1);
                let (id, description) = if stuck { (1, "In Queue") } else { (2, "Processing") };
                json!({
                    "token": token,
                    "stdout": null,
                    "status": {"id": id, "description": description}
                })
            }
            Some(run) => judge.finished_run(token, &run.stdin),
        })
        .collect();

    // Out of request order on purpose.
    results.reverse();
    Json(json!({ "submissions": results }))
}

/// In-memory `SubmissionStore`.
#[derive(Default)]
pub struct MemoryStore {
    submissions: Mutex<Vec<Submission>>,
    cases: Mutex<Vec<TestCaseResult>>,
    solved: Mutex<HashSet<(String, String)>>,
}

impl MemoryStore {
    pub fn solved_count(&self) -> usize {
        self.solved.lock().unwrap().len()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn record_submission(
        &self,
        submission: NewSubmission,
        test_cases: Vec<NewTestCaseResult>,
        solved: bool,
    ) -> Result<Uuid, sqlx::Error> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.cases
            .lock()
            .unwrap()
            .extend(test_cases.into_iter().map(|case| TestCaseResult {
                id: Uuid::new_v4(),
                submission_id: id,
                test_case: case.test_case,
                passed: case.passed,
                stdout: case.stdout,
                expected: case.expected,
                stderr: case.stderr,
                compile_output: case.compile_output,
                status: case.status,
                memory: case.memory,
                time: case.time,
                created_at: now,
            }));
        if solved {
            self.solved
                .lock()
                .unwrap()
                .insert((submission.user_id.clone(), submission.problem_id.clone()));
        }
        self.submissions.lock().unwrap().push(Submission {
            id,
            user_id: submission.user_id,
            problem_id: submission.problem_id,
            source_code: submission.source_code,
            language: submission.language,
            stdin: submission.stdin,
            status: submission.status,
            created_at: now,
        });
        Ok(id)
    }

    async fn get_submission(
        &self,
        id: Uuid,
    ) -> Result<Option<SubmissionWithTestCases>, sqlx::Error> {
        let submission = self
            .submissions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned();
        let cases = self
            .cases
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.submission_id == id)
            .cloned()
            .collect();
        Ok(submission.map(|s| SubmissionWithTestCases::new(s, cases)))
    }

    async fn list_submissions(
        &self,
        user_id: &str,
        problem_id: Option<&str>,
    ) -> Result<Vec<Submission>, sqlx::Error> {
        let mut found: Vec<Submission> = self
            .submissions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id && problem_id.map_or(true, |p| s.problem_id == p))
            .cloned()
            .collect();
        found.reverse();
        Ok(found)
    }

    async fn count_submissions(&self, problem_id: &str) -> Result<i64, sqlx::Error> {
        Ok(self
            .submissions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.problem_id == problem_id)
            .count() as i64)
    }

    async fn solved_problem_ids(&self, user_id: &str) -> Result<Vec<String>, sqlx::Error> {
        Ok(self
            .solved
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| u == user_id)
            .map(|(_, p)| p.clone())
            .collect())
    }
}

pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

pub fn fast_settings(base_url: &str) -> JudgeSettings {
    JudgeSettings {
        poll_interval: Duration::from_millis(10),
        poll_timeout: Duration::from_secs(5),
        ..JudgeSettings::new(base_url)
    }
}

pub struct TestResponse {
    pub status: u16,
    pub body: Value,
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub judge: Arc<MockJudge>,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub async fn spawn(behavior: Behavior) -> Self {
        Self::spawn_with(behavior, Duration::from_secs(5)).await
    }

    pub async fn spawn_with(behavior: Behavior, poll_timeout: Duration) -> Self {
        let judge = MockJudge::new(behavior);
        let judge_url = judge.serve().await;

        let settings = JudgeSettings {
            poll_timeout,
            ..fast_settings(&judge_url)
        };
        let config = Config {
            database_url: String::new(),
            db_max_connections: 1,
            jwt_secret: JWT_SECRET.to_string(),
            judge: settings.clone(),
            host: "127.0.0.1".into(),
            port: 0,
        };

        let store = Arc::new(MemoryStore::default());
        let state = Arc::new(AppState {
            judge: Arc::new(Judge0Client::new(settings).expect("judge client")),
            store: store.clone(),
            config: Arc::new(config),
        });

        let addr = serve(codeforge::routes::router(state)).await;

        Self {
            addr,
            client: reqwest::Client::new(),
            judge,
            store,
        }
    }

    pub fn token_for(&self, user_id: &str) -> String {
        let claims = Claims {
            id: user_id.to_string(),
            exp: (Utc::now().timestamp() + 3600) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value, token: Option<&str>) -> TestResponse {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.header("Cookie", format!("jwt={token}"));
        }
        into_test_response(request.send().await.expect("request failed")).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        into_test_response(request.send().await.expect("request failed")).await
    }
}

async fn into_test_response(response: reqwest::Response) -> TestResponse {
    let status = response.status().as_u16();
    let body = response.json().await.unwrap_or(Value::Null);
    TestResponse { status, body }
}

pub fn execute_body(stdin: &[&str], expected: &[&str]) -> Value {
    json!({
        "source_code": "print(input())",
        "language_id": 71,
        "stdin": stdin,
        "expected_outputs": expected,
        "problemId": "two-sum",
    })
}
