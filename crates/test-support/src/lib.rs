//! Shared helpers for tests across the workspace: a mock Snap Store, an in-process HTTP server
//! harness, and process/port utilities for binary-level integration tests.

use anyhow::Context as _;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener};
use std::process::Child;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub struct KillOnDrop(pub Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let _ = self.0.kill();
    }
}

/// Pick an unused TCP port on localhost.
///
/// Note: this does not reserve the port; it's still possible for another process to bind it
/// before you do.
///
/// # Errors
///
/// Returns an error if binding an ephemeral localhost port fails or if the bound socket's
/// local address cannot be read.
pub fn pick_unused_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").context("bind ephemeral port")?;
    Ok(listener.local_addr()?.port())
}

/// Poll an HTTP URL until it returns a success status (2xx/3xx).
///
/// # Errors
///
/// Returns an error if the timeout elapses before the endpoint returns a success status.
pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let start = Instant::now();
    loop {
        if start.elapsed() > timeout_dur {
            anyhow::bail!("timed out waiting for {url}");
        }

        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            _ => tokio::time::sleep(Duration::from_millis(200)).await,
        }
    }
}

/// An axum app served on an ephemeral localhost port until dropped.
pub struct MockServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl MockServer {
    /// # Errors
    ///
    /// Returns an error if no localhost port can be bound.
    pub async fn start(app: Router) -> anyhow::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind mock server")?;
        let addr = listener.local_addr().context("mock server local_addr")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Self {
            addr,
            shutdown: Some(shutdown_tx),
            handle,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.abort();
    }
}

/// A canned upstream response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
}

impl MockResponse {
    #[must_use]
    pub fn json(body: &Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    #[must_use]
    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn status(status: u16) -> Self {
        Self::raw(status, "{}")
    }
}

impl IntoResponse for MockResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

/// In-memory stand-in for the Snap Store v2 endpoints used by the client:
/// `GET /v2/snaps/find` and `GET /v2/snaps/info/{name}`.
///
/// Unknown package names answer 404 with the store's `error-list` shape.
#[derive(Clone, Default)]
pub struct MockSnapStore {
    state: Arc<MockState>,
}

#[derive(Default)]
struct MockState {
    search: Mutex<Option<MockResponse>>,
    info: Mutex<HashMap<String, MockResponse>>,
    hits: AtomicUsize,
}

impl MockSnapStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every search with `{"results": entries}`.
    #[must_use]
    pub fn with_search_results(self, entries: Vec<Value>) -> Self {
        self.with_search_response(MockResponse::json(&json!({ "results": entries })))
    }

    #[must_use]
    pub fn with_search_response(self, response: MockResponse) -> Self {
        *self.state.search.lock() = Some(response);
        self
    }

    /// Serve `body` (an info payload) for `GET /v2/snaps/info/{name}`.
    #[must_use]
    pub fn with_package(self, name: &str, body: &Value) -> Self {
        self.with_info_response(name, MockResponse::json(body))
    }

    #[must_use]
    pub fn with_info_response(self, name: &str, response: MockResponse) -> Self {
        self.state.info.lock().insert(name.to_string(), response);
        self
    }

    /// Number of requests served so far (both endpoints).
    #[must_use]
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .route("/v2/snaps/find", get(find))
            .route("/v2/snaps/info/{name}", get(info))
            .with_state(self.clone())
    }

    /// # Errors
    ///
    /// Returns an error if the mock server cannot bind a port.
    pub async fn start(&self) -> anyhow::Result<MockServer> {
        MockServer::start(self.router()).await
    }
}

async fn find(State(store): State<MockSnapStore>) -> MockResponse {
    store.state.hits.fetch_add(1, Ordering::SeqCst);
    store
        .state
        .search
        .lock()
        .clone()
        .unwrap_or_else(|| MockResponse::json(&json!({ "results": [] })))
}

async fn info(State(store): State<MockSnapStore>, Path(name): Path<String>) -> MockResponse {
    store.state.hits.fetch_add(1, Ordering::SeqCst);
    store.state.info.lock().get(&name).cloned().unwrap_or_else(|| {
        MockResponse {
            status: 404,
            body: json!({
                "error-list": [{
                    "code": "resource-not-found",
                    "message": format!("No snap named '{name}' found in series '16'.")
                }]
            })
            .to_string(),
        }
    })
}

/// A `/v2/snaps/find` result entry in the store's shape.
#[must_use]
pub fn search_entry(name: &str, title: &str, summary: &str) -> Value {
    json!({
        "name": name,
        "snap-id": format!("{name}-id"),
        "snap": {
            "title": title,
            "summary": summary,
            "publisher": {
                "display-name": format!("{title} Team"),
                "username": name,
                "validation": "verified"
            }
        },
        "revision": { "version": "1.0" }
    })
}

/// A `/v2/snaps/info/{name}` payload with a single `latest/stable` amd64 release.
#[must_use]
pub fn info_body(name: &str, title: &str, version: &str) -> Value {
    json!({
        "name": name,
        "snap-id": format!("{name}-id"),
        "snap": {
            "title": title,
            "summary": format!("{title} summary"),
            "description": format!("{title} is a test package."),
            "license": "MIT",
            "publisher": {
                "display-name": format!("{title} Team"),
                "username": name,
                "validation": "unproven"
            },
            "contact": format!("https://example.com/{name}/contact"),
            "website": format!("https://example.com/{name}")
        },
        "channel-map": [{
            "channel": {
                "name": "stable",
                "track": "latest",
                "risk": "stable",
                "architecture": "amd64",
                "released-at": "2026-01-01T00:00:00+00:00"
            },
            "version": version,
            "revision": 42,
            "confinement": "strict",
            "download": { "size": 1_048_576 }
        }]
    })
}
