use crate::app_state::AppState;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::collections::HashSet;
use tracing::debug;

const ALLOWED_METHODS: &str = "POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type";

/// Origins allowed to call the relay; empty means any origin.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    allowed_origins: HashSet<String>,
}

impl CorsPolicy {
    pub fn new(allowed_origins: &[String]) -> Self {
        Self {
            allowed_origins: allowed_origins
                .iter()
                .map(|origin| origin.trim().trim_end_matches('/').to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
        }
    }

    pub fn allow_origin(&self, origin: Option<&HeaderValue>) -> Option<HeaderValue> {
        if self.allowed_origins.is_empty() {
            return Some(HeaderValue::from_static("*"));
        }
        let origin = origin?;
        self.allowed_origins
            .contains(origin.to_str().ok()?)
            .then(|| origin.clone())
    }

    pub fn apply(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        if !self.allowed_origins.is_empty() {
            headers.append(VARY, HeaderValue::from_static("Origin"));
        }
        match self.allow_origin(origin) {
            Some(allowed) => {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allowed);
            }
            None => debug!(?origin, "origin is not allowed"),
        }
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
    }
}

/// Sets access-control headers on every response and answers pre-flights with 204.
pub async fn cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(policy) = state.cors.as_deref() else {
        return next.run(request).await;
    };
    let origin = request.headers().get(ORIGIN).cloned();
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };
    policy.apply(origin.as_ref(), response.headers_mut());
    response
}
