#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use relay_server::http::{AppState, CorsPolicy, build_router};
use serde_json::{Value, json};
use shared::llm::{AnthropicGateway, AnthropicGatewayConfig, CompletionGateway};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};
use uuid::Uuid;

pub const TEST_FRONTEND_ORIGIN: &str = "https://scoper.example.test";

#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

impl UpstreamReply {
    pub fn text(text: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: json!({
                "id": "msg-integration",
                "type": "message",
                "role": "assistant",
                "model": "stub-model",
                "content": [{ "type": "text", "text": text }],
                "stop_reason": "end_turn"
            }),
        }
    }

    pub fn error(status: StatusCode, kind: &str) -> Self {
        Self {
            status,
            body: json!({
                "type": "error",
                "error": { "type": kind, "message": "stubbed provider failure" }
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct UpstreamState {
    replies: Arc<Mutex<VecDeque<UpstreamReply>>>,
    payloads: Arc<Mutex<Vec<Value>>>,
}

/// Stand-in for the provider's messages endpoint. Replies are served in order; once they run
/// out every call fails with a 500.
pub struct StubUpstream {
    pub url: String,
    state: UpstreamState,
    server: TestServer,
}

impl StubUpstream {
    pub async fn start(replies: Vec<UpstreamReply>) -> Self {
        let state = UpstreamState {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            payloads: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/v1/messages", post(upstream_messages))
            .with_state(state.clone());
        let server = TestServer::spawn(app).await;

        Self {
            url: format!("{}/v1/messages", server.base_url),
            state,
            server,
        }
    }

    pub async fn payloads(&self) -> Vec<Value> {
        self.state.payloads.lock().await.clone()
    }

    pub async fn stop(self) {
        self.server.stop().await;
    }
}

async fn upstream_messages(
    State(state): State<UpstreamState>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.payloads.lock().await.push(payload);
    let reply = state
        .replies
        .lock()
        .await
        .pop_front()
        .unwrap_or_else(|| UpstreamReply::error(StatusCode::INTERNAL_SERVER_ERROR, "api_error"));
    (reply.status, Json(reply.body))
}

/// The relay router served on an ephemeral local port.
pub struct RelayHarness {
    pub base_url: String,
    server: TestServer,
}

impl RelayHarness {
    /// Starts the relay. With `upstream_url == None` the relay runs without a credential.
    pub async fn start(upstream_url: Option<&str>) -> Self {
        let gateway = upstream_url.map(|api_url| {
            let gateway = AnthropicGateway::new(AnthropicGatewayConfig {
                api_url: api_url.to_string(),
                api_key: "integration-test-key".to_string(),
                model: "test-model".to_string(),
                max_tokens: 4000,
                timeout_ms: 5_000,
            })
            .expect("gateway should build");
            Arc::new(gateway) as Arc<dyn CompletionGateway>
        });

        let app = build_router(AppState {
            environment: "test".to_string(),
            cors: CorsPolicy::new(vec![
                "http://localhost:5173".to_string(),
                "https://localhost:5173".to_string(),
                TEST_FRONTEND_ORIGIN.to_string(),
            ]),
            gateway,
        });
        let server = TestServer::spawn(app).await;

        Self {
            base_url: server.base_url.clone(),
            server,
        }
    }

    pub async fn stop(self) {
        self.server.stop().await;
    }
}

/// Any router served on `127.0.0.1:0` until [`TestServer::stop`] is called.
pub struct TestServer {
    pub base_url: String,
    shutdown_tx: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn(app: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let local_addr = listener
            .local_addr()
            .expect("listener address should resolve");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("test server should run");
        });

        Self {
            base_url: format!("http://{local_addr}"),
            shutdown_tx,
            task,
        }
    }

    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        self.task.await.expect("server task should join");
    }
}

/// Fresh store file location under the system temp dir.
pub fn temp_store_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("scoper-chat-it-{}", Uuid::new_v4()))
        .join("store.json")
}

/// An address nothing listens on.
pub async fn unused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let local_addr = listener
        .local_addr()
        .expect("listener address should resolve");
    drop(listener);
    format!("http://{local_addr}")
}
