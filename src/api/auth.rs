//! Shared-secret authentication for mutating endpoints.
//!
//! The secret may arrive as `Authorization: Bearer <token>` or in the
//! dedicated `x-api-token` header; the two are accepted identically. With no
//! secret configured the coordinator fails closed: every mutating call is
//! refused with an explicit diagnostic rather than silently allowed.

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::protocol::ErrorResponse;
use crate::config::CoordinatorConfig;

pub const TOKEN_HEADER: &str = "x-api-token";

/// Validates the request's token. On failure, returns the response to send
/// back so handlers can `return` it directly.
pub fn check_token(config: &CoordinatorConfig, headers: &HeaderMap) -> Result<(), Response> {
    let Some(expected) = config.api_token.as_deref() else {
        return Err(error_response(
            StatusCode::UNAUTHORIZED,
            "token required but not configured",
        ));
    };

    match presented_token(headers) {
        None => Err(error_response(StatusCode::UNAUTHORIZED, "missing API token")),
        Some(token) if token == expected => Ok(()),
        Some(_) => Err(error_response(StatusCode::FORBIDDEN, "invalid API token")),
    }
}

fn presented_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.trim());
            }
        }
    }
    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
}

pub fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
