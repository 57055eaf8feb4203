//! Shared mock servers for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;

use visit_aggregator::config::AggregatorConfig;
use visit_aggregator::http::HttpServer;
use visit_aggregator::lifecycle::Shutdown;
use visit_aggregator::visits::LocationSet;

/// What the mock upstream answers for one location.
#[derive(Clone, Debug)]
#[allow(dead_code)]
pub enum Reply {
    /// JSON body.
    Json(Value),
    /// Raw text body with the given status.
    Text(u16, &'static str),
    /// Never answers in any useful time.
    Hang,
}

async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

async fn upstream_handler(
    State(replies): State<Arc<HashMap<String, Reply>>>,
    Path(file): Path<String>,
) -> Response {
    let location = file.strip_suffix(".json").unwrap_or(&file);
    match replies.get(location) {
        Some(Reply::Json(value)) => Json(value.clone()).into_response(),
        Some(Reply::Text(status, body)) => {
            (StatusCode::from_u16(*status).unwrap(), *body).into_response()
        }
        Some(Reply::Hang) => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Json(0).into_response()
        }
        None => (StatusCode::NOT_FOUND, "<html>Not Found</html>").into_response(),
    }
}

/// Start a mock upstream; returns its base URL (without trailing slash).
pub async fn start_upstream(replies: HashMap<String, Reply>) -> String {
    let (listener, addr) = bind().await;
    let app = Router::new()
        .route("/member_visits_v2/{file}", get(upstream_handler))
        .with_state(Arc::new(replies));

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}/member_visits_v2", addr)
}

/// Requests received by the mock store.
#[derive(Clone, Default)]
pub struct StoreLog {
    pub inserts: Arc<Mutex<Vec<Value>>>,
    pub headers: Arc<Mutex<Vec<HeaderMap>>>,
    pub tables: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl StoreLog {
    pub fn insert_count(&self) -> usize {
        self.inserts.lock().unwrap().len()
    }

    pub fn last_insert(&self) -> Value {
        self.inserts.lock().unwrap().last().cloned().unwrap_or(Value::Null)
    }
}

/// Error body the mock store sends with a non-2xx status.
#[derive(Clone)]
enum StoreBody {
    Json(Value),
    Text(&'static str),
}

#[derive(Clone)]
struct StoreState {
    log: StoreLog,
    status: StatusCode,
    body: StoreBody,
}

async fn store_handler(
    State(state): State<StoreState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(rows): Json<Value>,
) -> Response {
    state.log.inserts.lock().unwrap().push(rows);
    state.log.headers.lock().unwrap().push(headers);
    state.log.tables.lock().unwrap().push(table);

    if state.status.is_success() {
        return state.status.into_response();
    }
    match state.body {
        StoreBody::Json(body) => (state.status, Json(body)).into_response(),
        StoreBody::Text(body) => (state.status, body).into_response(),
    }
}

/// Start a mock PostgREST store answering every insert with `status`/`body`.
pub async fn start_store(status: u16, body: Value) -> (String, StoreLog) {
    serve_store(status, StoreBody::Json(body)).await
}

/// Like [`start_store`], with a plain-text error body.
#[allow(dead_code)]
pub async fn start_store_text(status: u16, body: &'static str) -> (String, StoreLog) {
    serve_store(status, StoreBody::Text(body)).await
}

async fn serve_store(status: u16, body: StoreBody) -> (String, StoreLog) {
    let (listener, addr) = bind().await;
    let log = StoreLog::default();
    let state = StoreState {
        log: log.clone(),
        status: StatusCode::from_u16(status).unwrap(),
        body,
    };
    let app = Router::new()
        .route("/rest/v1/{table}", post(store_handler))
        .with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}", addr), log)
}

/// Default config pointed at the given mocks.
pub fn config_for(upstream_url: &str, store_url: &str) -> AggregatorConfig {
    let mut config = AggregatorConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.base_url = upstream_url.to_string();
    config.upstream.timeout_secs = 1;
    config.store.url = store_url.to_string();
    config.store.api_key = "test-service-key".to_string();
    config.store.timeout_secs = 2;
    config.observability.metrics_enabled = false;
    config
}

/// Start the aggregator; returns its address and the shutdown handle.
pub async fn start_aggregator(config: AggregatorConfig) -> (SocketAddr, Shutdown) {
    let (listener, addr) = bind().await;
    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// The 25 built-in location identifiers.
pub fn locations() -> Vec<String> {
    LocationSet::builtin().unwrap().iter().map(String::from).collect()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
