//! Session marker middleware
//!
//! Requests carry `x-eduai-timestamp` and `x-eduai-hash` headers; see
//! `eduai_common::api::auth` for the hash scheme.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use eduai_common::api::{validate_session, SessionAuthError, HASH_HEADER, TIMESTAMP_HEADER};
use serde_json::json;
use tracing::warn;

use crate::AppState;

/// Session middleware
///
/// Returns 401 Unauthorized if validation fails, 400 if headers are absent
/// or malformed. Applied to protected routes only.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Secret 0 disables all session checking
    if state.shared_secret == 0 {
        return Ok(next.run(request).await);
    }

    let headers = request.headers();
    let timestamp = header_value(headers, TIMESTAMP_HEADER)?
        .trim()
        .parse::<i64>()
        .map_err(|e| AuthError::ParseError(format!("{}: {}", TIMESTAMP_HEADER, e)))?;
    let hash = header_value(headers, HASH_HEADER)?;

    validate_session(timestamp, hash, state.shared_secret, state.session_window).map_err(
        |e| match e {
            SessionAuthError::InvalidTimestamp { reason, .. } => {
                AuthError::InvalidTimestamp(reason)
            }
            SessionAuthError::InvalidHash {
                provided,
                calculated,
            } => {
                warn!(
                    "Session hash validation failed: provided={}, calculated={}",
                    provided, calculated
                );
                AuthError::InvalidHash
            }
        },
    )?;

    Ok(next.run(request).await)
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AuthError> {
    headers
        .get(name)
        .ok_or_else(|| AuthError::MissingFields(name.to_string()))?
        .to_str()
        .map_err(|e| AuthError::ParseError(format!("{}: {}", name, e)))
}

/// Session error types for HTTP responses
#[derive(Debug)]
pub enum AuthError {
    InvalidTimestamp(String),
    InvalidHash,
    MissingFields(String),
    ParseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::InvalidTimestamp(reason) => (
                StatusCode::UNAUTHORIZED,
                format!("Invalid timestamp: {}", reason),
            ),
            AuthError::InvalidHash => (StatusCode::UNAUTHORIZED, "Invalid hash".to_string()),
            AuthError::MissingFields(header) => (
                StatusCode::BAD_REQUEST,
                format!("Missing session header: {}", header),
            ),
            AuthError::ParseError(msg) => {
                (StatusCode::BAD_REQUEST, format!("Parse error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
