//! Shared test infrastructure for integration tests.
//!
//! `StubServer` serves a fixed route table from an axum router on a loopback
//! port and records every request it sees, so tests can run the real `dprov`
//! binary against it and assert on call counts.

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

const NOT_FOUND_BODY: &str = r#"{"errors":[{"message":"not found"}]}"#;
const EMPTY_DATA_BODY: &str = r#"{"data":{}}"#;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

type Routes = HashMap<(String, String), (u16, String)>;

#[derive(Clone)]
struct StubState {
    routes: Arc<Routes>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Unrouted GETs answer 404 and unrouted POSTs answer 200 `{"data":{}}`.
pub struct StubServer {
    url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    _runtime: Runtime,
}

impl StubServer {
    pub fn start(routes: &[(&str, &str, u16, &str)]) -> Self {
        let routes: Routes = routes
            .iter()
            .map(|(method, path, status, body)| {
                (
                    (method.to_string(), path.to_string()),
                    (*status, body.to_string()),
                )
            })
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            routes: Arc::new(routes),
            requests: Arc::clone(&requests),
        };
        let app = Router::new().fallback(answer).with_state(state);

        let runtime = Runtime::new().expect("tokio runtime");
        let listener = runtime
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .expect("bind stub server");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));
        runtime.spawn(async move { axum::serve(listener, app).await });

        Self {
            url,
            requests,
            _runtime: runtime,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }
}

async fn answer(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let method = method.as_str().to_string();
    let path = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), |target| target.to_string());
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let request = RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization,
        body,
    };
    state.requests.lock().expect("requests lock").push(request);

    let (status, body) = match state.routes.get(&(method.clone(), path)) {
        Some(route) => route.clone(),
        None if method == "GET" => (404, NOT_FOUND_BODY.to_string()),
        None => (200, EMPTY_DATA_BODY.to_string()),
    };
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

/// Run the built `dprov` binary with the credential environment cleared.
pub fn run_dprov(args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_dprov"));
    for name in [
        "HTTP_PROXY",
        "HTTPS_PROXY",
        "ALL_PROXY",
        "http_proxy",
        "https_proxy",
        "all_proxy",
        "DIRECTUS_ADMIN_TOKEN",
        "DIRECTUS_ADMIN_EMAIL",
        "DIRECTUS_ADMIN_PASSWORD",
        "DIRECTUS_URL",
        "RUST_LOG",
    ] {
        command.env_remove(name);
    }
    command.args(args).output().expect("run dprov")
}

/// Write a schema table into `dir` and return its path.
pub fn write_schema(dir: &Path, schema: &Value) -> PathBuf {
    let path = dir.join("schema.json");
    let text = serde_json::to_vec_pretty(schema).expect("serialize schema");
    std::fs::write(&path, text).expect("write schema");
    path
}
