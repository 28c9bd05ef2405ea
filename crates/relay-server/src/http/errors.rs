use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::llm::CompletionError;
use shared::models::ChatResponse;
use tracing::{error, warn};

pub(super) fn chat_error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ChatResponse::failure(message))).into_response()
}

pub(super) fn bad_request_response(message: &str) -> Response {
    chat_error_response(StatusCode::BAD_REQUEST, message)
}

pub(super) fn configuration_error_response() -> Response {
    error!("upstream credential is not configured");
    chat_error_response(StatusCode::INTERNAL_SERVER_ERROR, "API configuration error")
}

/// Collapses upstream failures into the relay's public taxonomy. Details stay in the logs.
pub(super) fn upstream_error_response(err: &CompletionError) -> Response {
    match err.status() {
        Some(401) => {
            error!("upstream rejected relay credential: {err}");
            chat_error_response(StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed")
        }
        Some(429) => {
            warn!("upstream rate limited relay: {err}");
            chat_error_response(
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded. Please try again later.",
            )
        }
        _ => {
            error!("chat completion failed: {err}");
            chat_error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

pub(super) async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}
