//! In-process stand-in for the support backend, served by axum on an
//! ephemeral port.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use shared::config::client::ClientConfig;
use tokio::{net::TcpListener, sync::Notify};
use url::Url;

#[derive(Debug)]
struct Behaviour {
    health: Option<Value>,
    count: Option<u64>,
    chat_failure: bool,
    hold_chat: bool,
    chat_requests: Vec<Value>,
    upload_failure: Option<Option<String>>,
    uploads: Vec<(String, String)>,
    clear_failure: Option<Option<String>>,
    clear_calls: usize,
    resources: Value,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            health: Some(json!({
                "status": "healthy",
                "rag_enabled": true,
                "documents_count": 5,
                "default_provider": "claude",
                "providers": ["ollama", "claude"]
            })),
            count: Some(5),
            chat_failure: false,
            hold_chat: false,
            chat_requests: Vec::new(),
            upload_failure: None,
            uploads: Vec::new(),
            clear_failure: None,
            clear_calls: 0,
            resources: json!({ "resources": [] }),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Shared {
    behaviour: Arc<Mutex<Behaviour>>,
    release_chat: Arc<Notify>,
}

impl Shared {
    fn with<R>(&self, f: impl FnOnce(&mut Behaviour) -> R) -> R {
        let mut guard = self
            .behaviour
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

/// Handle to a running fake backend.
#[derive(Debug)]
pub struct FakeBackend {
    addr: SocketAddr,
    shared: Shared,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let shared = Shared::default();
        let app = Router::new()
            .route("/api/health", get(health))
            .route("/api/documents/count", get(count))
            .route("/api/chat", post(chat))
            .route("/api/upload", post(upload))
            .route("/api/documents", delete(clear))
            .route("/static/data/resources-web.json", get(resources))
            .with_state(shared.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, shared }
    }

    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    /// Replaces the health body; `None` makes the endpoint answer 500.
    pub fn set_health(&self, body: Option<Value>) {
        self.shared.with(|b| b.health = body);
    }

    /// Replaces the count; `None` makes the endpoint answer 500.
    pub fn set_count(&self, count: Option<u64>) {
        self.shared.with(|b| b.count = count);
    }

    pub fn fail_chat(&self) {
        self.shared.with(|b| b.chat_failure = true);
    }

    /// Chat replies wait for [`FakeBackend::release_chat`].
    pub fn hold_chat(&self) {
        self.shared.with(|b| b.hold_chat = true);
    }

    pub fn release_chat(&self) {
        self.shared.release_chat.notify_one();
    }

    pub fn chat_requests(&self) -> Vec<Value> {
        self.shared.with(|b| b.chat_requests.clone())
    }

    /// `Some(detail)` answers 400 with that detail, `None` a bare 500.
    pub fn fail_uploads_with(&self, detail: Option<&str>) {
        self.shared
            .with(|b| b.upload_failure = Some(detail.map(ToString::to_string)));
    }

    pub fn upload_calls(&self) -> usize {
        self.shared.with(|b| b.uploads.len())
    }

    /// `(filename, content type)` of every upload received.
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.shared.with(|b| b.uploads.clone())
    }

    pub fn fail_clear_with(&self, detail: Option<&str>) {
        self.shared
            .with(|b| b.clear_failure = Some(detail.map(ToString::to_string)));
    }

    pub fn clear_calls(&self) -> usize {
        self.shared.with(|b| b.clear_calls)
    }

    pub fn set_resources(&self, document: Value) {
        self.shared.with(|b| b.resources = document);
    }

    /// Polls until `n` chat requests have arrived.
    pub async fn wait_for_chat_requests(&self, n: usize) {
        for _ in 0..200 {
            if self.chat_requests().len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("backend never received {n} chat request(s)");
    }
}

/// Default config pointed at `backend`.
pub fn config_for(backend: &FakeBackend) -> ClientConfig {
    let mut config = ClientConfig::with_defaults();
    config.server_url = backend.url();
    config
}

/// Config pointed at a port nothing listens on.
pub async fn unreachable_config() -> ClientConfig {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let mut config = ClientConfig::with_defaults();
    config.server_url = Url::parse(&format!("http://{addr}")).unwrap();
    config
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

async fn health(State(shared): State<Shared>) -> Response {
    match shared.with(|b| b.health.clone()) {
        Some(body) => Json(body).into_response(),
        None => internal_error(),
    }
}

async fn count(State(shared): State<Shared>) -> Response {
    match shared.with(|b| b.count) {
        Some(count) => Json(json!({ "count": count })).into_response(),
        None => internal_error(),
    }
}

async fn chat(State(shared): State<Shared>, Json(body): Json<Value>) -> Response {
    let (fail, hold) = shared.with(|b| {
        b.chat_requests.push(body.clone());
        (b.chat_failure, b.hold_chat)
    });
    if hold {
        shared.release_chat.notified().await;
    }
    if fail {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "model crashed" })),
        )
            .into_response();
    }
    let message = body["message"].as_str().unwrap_or_default();
    Json(json!({
        "response": format!("Guidance for: {message}"),
        "sources": [
            { "source": "handbook.pdf", "chunk": 0 },
            { "source": "handbook.pdf", "chunk": 3 },
            { "source": "faq.txt", "chunk": 1 }
        ],
        "provider": body["provider"].as_str().unwrap_or("claude")
    }))
    .into_response()
}

async fn upload(State(shared): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let text = String::from_utf8_lossy(&body);
    let filename = text
        .split("filename=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap_or_default()
        .to_string();

    let failure = shared.with(|b| {
        b.uploads.push((filename.clone(), content_type));
        b.upload_failure.clone()
    });
    match failure {
        Some(Some(detail)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
        }
        Some(None) => internal_error(),
        None => {
            shared.with(|b| b.count = b.count.map(|c| c + 4));
            Json(json!({ "filename": filename, "chunks_created": 4, "status": "success" }))
                .into_response()
        }
    }
}

async fn clear(State(shared): State<Shared>) -> Response {
    let failure = shared.with(|b| {
        b.clear_calls += 1;
        b.clear_failure.clone()
    });
    match failure {
        Some(Some(detail)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": detail })),
        )
            .into_response(),
        Some(None) => internal_error(),
        None => {
            shared.with(|b| {
                b.count = Some(0);
                if let Some(health) = b.health.as_mut() {
                    health["documents_count"] = json!(0);
                }
            });
            Json(json!({ "status": "success", "message": "All documents cleared" }))
                .into_response()
        }
    }
}

async fn resources(State(shared): State<Shared>) -> Response {
    Json(shared.with(|b| b.resources.clone())).into_response()
}
