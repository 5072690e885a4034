//! Request ids and caller identity.
//!
//! Every request gets an `x-request-id` (taken from the client if present)
//! that is echoed on the response and attached to the request's log lines.
//!
//! Callers identify themselves with the `x-user-handle` header, the handle
//! the chat front-end already knows them by. Handlers that change state
//! take a [`Caller`]; whether that caller may run a given command is
//! decided by the [`tourney::Authorizer`] in the app state.

use axum::{
    Json,
    extract::{FromRequestParts, Request},
    http::{HeaderMap, HeaderValue, StatusCode, request::Parts},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

use super::errors::{ErrorResponse, error_response};
use crate::metrics;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header naming the calling user
pub const USER_HANDLE_HEADER: &str = "x-user-handle";

/// Generate or extract request ID from headers
fn get_or_generate_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Middleware to add request ID to all requests and responses
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = get_or_generate_request_id(request.headers());
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let method = request.method().clone();
    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %request.uri(),
        "Request started"
    );

    let started = Instant::now();
    let response = next.run(request).await;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    let (mut parts, body) = response.into_parts();
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        parts.headers.insert(REQUEST_ID_HEADER, header_value);
    }

    metrics::http_requests_total(method.as_str(), parts.status.as_u16());
    metrics::http_request_duration_ms(method.as_str(), elapsed_ms);
    tracing::info!(
        request_id = %request_id,
        status = %parts.status,
        "Request completed"
    );

    Response::from_parts(parts, body)
}

/// Request ID wrapper stored in request extensions
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl RequestId {
    /// Get the request ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestId>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Request ID not found in extensions",
        ))
    }
}

/// Identity of the user making a request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller(pub String);

impl Caller {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn caller_from_headers(headers: &HeaderMap) -> Option<Caller> {
    headers
        .get(USER_HANDLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|handle| !handle.is_empty())
        .map(|handle| Caller(handle.to_string()))
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller_from_headers(&parts.headers).ok_or_else(|| {
            error_response(
                StatusCode::UNAUTHORIZED,
                format!("Missing {USER_HANDLE_HEADER} header"),
            )
        })
    }
}
