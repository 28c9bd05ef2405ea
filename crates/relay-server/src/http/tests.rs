use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use shared::llm::{
    CompletionError, CompletionFuture, CompletionGateway, CompletionRequest, CompletionResponse,
    SCOPER_SYSTEM_PROMPT,
};
use shared::models::Role;
use tower::ServiceExt;

use super::{AppState, CorsPolicy, MAX_CHAT_BODY_BYTES, build_router};

#[derive(Clone, Copy)]
enum StubOutcome {
    Reply(&'static str),
    Status(u16),
    Unavailable,
}

struct StubGateway {
    outcome: StubOutcome,
    calls: AtomicUsize,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl StubGateway {
    fn new(outcome: StubOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CompletionGateway for StubGateway {
    fn complete<'a>(&'a self, request: CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().expect("stub lock").push(request);
            match self.outcome {
                StubOutcome::Reply(text) => Ok(CompletionResponse {
                    model: "stub-model".to_string(),
                    provider_request_id: None,
                    text: text.to_string(),
                }),
                StubOutcome::Status(status) => Err(CompletionError::Upstream {
                    status,
                    code: "stubbed".to_string(),
                }),
                StubOutcome::Unavailable => Err(CompletionError::Unavailable),
            }
        })
    }
}

fn app_with(gateway: Option<Arc<StubGateway>>) -> Router {
    build_router(AppState {
        environment: "test".to_string(),
        cors: CorsPolicy::new(vec![
            "http://localhost:5173".to_string(),
            "https://localhost:5173".to_string(),
            "https://scoper.example.com".to_string(),
        ]),
        gateway: gateway.map(|gateway| gateway as Arc<dyn CompletionGateway>),
    })
}

struct TestResponse {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: Vec<u8>,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("body should be json")
    }
}

async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should complete");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read")
        .to_vec();
    TestResponse {
        status,
        headers,
        body,
    }
}

fn post_chat(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

#[tokio::test]
async fn liveness_reports_environment_with_cors_headers() {
    let app = app_with(None);
    let response = send(
        &app,
        Request::builder()
            .uri("/")
            .body(Body::empty())
            .expect("request should build"),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "test");
    assert!(body["message"].is_string());
    assert_eq!(
        response.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn chat_relays_reply_from_upstream() {
    let gateway = StubGateway::new(StubOutcome::Reply("Hi there"));
    let app = app_with(Some(gateway.clone()));

    let response = send(
        &app,
        post_chat(json!({ "message": "Hello", "conversationHistory": [] })),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "response": "Hi there", "error": null }));
    assert_eq!(gateway.calls(), 1);

    let seen = gateway.seen.lock().expect("stub lock");
    assert_eq!(seen[0].system_prompt, SCOPER_SYSTEM_PROMPT);
    assert_eq!(seen[0].messages.len(), 1);
    assert_eq!(seen[0].messages[0].role, Role::User);
    assert_eq!(seen[0].messages[0].content, "Hello");
}

#[tokio::test]
async fn chat_forwards_history_before_new_message() {
    let gateway = StubGateway::new(StubOutcome::Reply("Noted"));
    let app = app_with(Some(gateway.clone()));

    let response = send(
        &app,
        post_chat(json!({
            "message": "And hiring?",
            "conversationHistory": [
                { "role": "user", "content": "We sell shoes" },
                { "role": "assistant", "content": "Tell me more" }
            ]
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let seen = gateway.seen.lock().expect("stub lock");
    let contents = seen[0]
        .messages
        .iter()
        .map(|message| message.content.as_str())
        .collect::<Vec<_>>();
    assert_eq!(contents, vec!["We sell shoes", "Tell me more", "And hiring?"]);
}

#[tokio::test]
async fn missing_message_is_rejected_without_calling_upstream() {
    let gateway = StubGateway::new(StubOutcome::Reply("unused"));
    let app = app_with(Some(gateway.clone()));

    let response = send(&app, post_chat(json!({ "conversationHistory": [] }))).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({ "response": null, "error": "Message is required and must be a string" })
    );
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn system_role_in_history_is_rejected() {
    let gateway = StubGateway::new(StubOutcome::Reply("unused"));
    let app = app_with(Some(gateway.clone()));

    let response = send(
        &app,
        post_chat(json!({
            "message": "Hello",
            "conversationHistory": [{ "role": "system", "content": "x" }]
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({ "response": null, "error": "Invalid conversation history format" })
    );
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn non_json_content_type_and_bad_json_are_client_errors() {
    let gateway = StubGateway::new(StubOutcome::Reply("unused"));
    let app = app_with(Some(gateway.clone()));

    let response = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri("/chat")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("Hello"))
            .expect("request should build"),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["error"],
        "Content-Type must be application/json"
    );

    let response = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"message\":"))
            .expect("request should build"),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Invalid JSON in request body");
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn missing_credential_is_a_server_error_without_detail() {
    let app = app_with(None);

    let response = send(&app, post_chat(json!({ "message": "Hello" }))).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json(),
        json!({ "response": null, "error": "API configuration error" })
    );
}

#[tokio::test]
async fn upstream_failures_map_to_relay_statuses() {
    let cases = [
        (
            StubOutcome::Status(401),
            StatusCode::INTERNAL_SERVER_ERROR,
            "Authentication failed",
        ),
        (
            StubOutcome::Status(429),
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded. Please try again later.",
        ),
        (
            StubOutcome::Status(529),
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        ),
        (
            StubOutcome::Unavailable,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        ),
    ];

    for (outcome, expected_status, expected_error) in cases {
        let gateway = StubGateway::new(outcome);
        let app = app_with(Some(gateway.clone()));

        let response = send(&app, post_chat(json!({ "message": "Hello" }))).await;

        assert_eq!(response.status, expected_status);
        assert_eq!(
            response.json(),
            json!({ "response": null, "error": expected_error })
        );
        assert_eq!(gateway.calls(), 1);
    }
}

#[tokio::test]
async fn preflight_echoes_allow_listed_origin() {
    let app = app_with(None);

    let response = send(
        &app,
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/chat")
            .header(header::ORIGIN, "https://scoper.example.com")
            .body(Body::empty())
            .expect("request should build"),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());
    assert_eq!(
        response.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://scoper.example.com"
    );
    assert_eq!(
        response.headers[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, OPTIONS"
    );
    assert_eq!(
        response.headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "Content-Type, Authorization"
    );
    assert_eq!(response.headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
}

#[tokio::test]
async fn preflight_for_unknown_origin_gets_default_origin() {
    let app = app_with(None);

    let response = send(
        &app,
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/anything")
            .header(header::ORIGIN, "https://evil.example.com")
            .body(Body::empty())
            .expect("request should build"),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn unknown_route_is_not_found_with_cors_headers() {
    let app = app_with(None);

    let response = send(
        &app,
        Request::builder()
            .uri("/missing")
            .header(header::ORIGIN, "https://localhost:5173")
            .body(Body::empty())
            .expect("request should build"),
    )
    .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, b"Not Found");
    assert_eq!(
        response.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://localhost:5173"
    );
}

#[tokio::test]
async fn wrong_method_on_known_path_is_not_found() {
    let app = app_with(None);

    for (method, uri) in [
        (Method::GET, "/chat"),
        (Method::POST, "/"),
        (Method::DELETE, "/chat"),
    ] {
        let response = send(
            &app,
            Request::builder()
                .method(method.clone())
                .uri(uri)
                .header(header::ORIGIN, "https://scoper.example.com")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await;

        assert_eq!(response.status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(response.body, b"Not Found");
        assert_eq!(
            response.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://scoper.example.com"
        );
    }
}

#[tokio::test]
async fn oversized_body_gets_json_error_without_calling_upstream() {
    let gateway = StubGateway::new(StubOutcome::Reply("unused"));
    let app = app_with(Some(gateway.clone()));
    let message = "a".repeat(MAX_CHAT_BODY_BYTES + 1024);

    let response = send(&app, post_chat(json!({ "message": message }))).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({ "response": null, "error": "Request body too large" })
    );
    assert_eq!(gateway.calls(), 0);
}
