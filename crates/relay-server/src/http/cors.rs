use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::AppState;

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";
const PREFLIGHT_MAX_AGE_SECONDS: &str = "86400";

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
}

impl CorsPolicy {
    /// An empty list is replaced with the local dev-server origin so a fallback always exists.
    pub fn new(allowed_origins: Vec<String>) -> Self {
        let allowed_origins = if allowed_origins.is_empty() {
            vec![shared::config::DEFAULT_FRONTEND_ORIGIN.to_string()]
        } else {
            allowed_origins
        };
        Self { allowed_origins }
    }

    /// Echoes a recognized origin; anything else gets the first allow-list entry.
    pub fn allow_origin_for<'a>(&'a self, origin: Option<&'a str>) -> &'a str {
        match origin {
            Some(origin) if self.allowed_origins.iter().any(|allowed| allowed == origin) => origin,
            _ => self.allowed_origins[0].as_str(),
        }
    }
}

pub(super) async fn cors_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    let allow_origin = state.cors.allow_origin_for(origin.as_deref()).to_string();

    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(req).await
    };

    apply_cors_headers(response.headers_mut(), &allow_origin);
    response
}

fn apply_cors_headers(headers: &mut HeaderMap, allow_origin: &str) {
    if let Ok(value) = HeaderValue::from_str(allow_origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(PREFLIGHT_MAX_AGE_SECONDS),
    );
}
