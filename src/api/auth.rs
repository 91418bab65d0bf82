//! Shared API key check
//!
//! When a key is configured, requests must carry it in `X-API-KEY`.

use super::types::ErrorResponse;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Configured API key; `None` leaves the API open
#[derive(Clone, Default)]
pub struct ApiKey(Option<Arc<str>>);

impl ApiKey {
    /// A blank key counts as no key
    pub fn new(key: Option<&str>) -> Self {
        Self(
            key.map(str::trim)
                .filter(|k| !k.is_empty())
                .map(Arc::from),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    /// Constant-time comparison against the configured key
    pub fn accepts(&self, candidate: Option<&str>) -> bool {
        match (&self.0, candidate) {
            (None, _) => true,
            (Some(key), Some(candidate)) => bool::from(candidate.as_bytes().ct_eq(key.as_bytes())),
            (Some(_), None) => false,
        }
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey")
            .field(&if self.is_enabled() { "<set>" } else { "<none>" })
            .finish()
    }
}

/// Reject requests without the configured key
pub async fn api_key_middleware(
    State(key): State<ApiKey>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let candidate = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    if key.accepts(candidate) {
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "Rejected request with missing or wrong API key");
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("unauthorized")),
    )
        .into_response()
}
