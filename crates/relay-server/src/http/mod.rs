use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Router, middleware};
use shared::llm::CompletionGateway;

mod chat;
mod cors;
mod errors;
mod health;
mod observability;
mod request_validation;

#[cfg(test)]
mod tests;

pub use cors::CorsPolicy;

/// Largest `/chat` body accepted; larger ones get a JSON 400.
pub const MAX_CHAT_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub environment: String,
    pub cors: CorsPolicy,
    /// `None` when no upstream credential is configured.
    pub gateway: Option<Arc<dyn CompletionGateway>>,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(health::liveness).fallback(errors::not_found))
        .route(
            "/chat",
            post(chat::chat)
                .fallback(errors::not_found)
                .layer(DefaultBodyLimit::max(MAX_CHAT_BODY_BYTES)),
        )
        .fallback(errors::not_found)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            cors::cors_middleware,
        ))
        .layer(middleware::from_fn(
            observability::request_observability_middleware,
        ))
        .with_state(app_state)
}
