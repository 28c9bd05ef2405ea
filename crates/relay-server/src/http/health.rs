use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use shared::models::HealthResponse;

use super::AppState;

pub(super) async fn liveness(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            message: "Scoper chat relay is running".to_string(),
            environment: state.environment,
        }),
    )
}
