use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use shared::llm::CompletionRequest;
use shared::models::ChatResponse;
use tracing::{info, warn};

use super::AppState;
use super::errors::{bad_request_response, configuration_error_response, upstream_error_response};
use super::request_validation::{parse_chat_request, validate_content_type};

pub(super) async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(
                status = rejection.status().as_u16(),
                "chat body could not be read: {rejection}"
            );
            let message = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                "Request body too large"
            } else {
                "Invalid JSON in request body"
            };
            return bad_request_response(message);
        }
    };

    let validated = match validate_content_type(&headers).and_then(|()| parse_chat_request(&body))
    {
        Ok(validated) => validated,
        Err(err) => {
            warn!(reason = %err, "rejected chat request");
            return bad_request_response(&err.to_string());
        }
    };

    let Some(gateway) = state.gateway.as_ref() else {
        return configuration_error_response();
    };

    let history_len = validated.history.len();
    let request = CompletionRequest::scoper(validated.history, validated.message);

    match gateway.complete(request).await {
        Ok(completion) => {
            info!(
                model = %completion.model,
                provider_request_id = completion.provider_request_id.as_deref().unwrap_or("none"),
                history_len,
                "chat completion relayed"
            );
            (StatusCode::OK, Json(ChatResponse::reply(completion.text))).into_response()
        }
        Err(err) => upstream_error_response(&err),
    }
}
