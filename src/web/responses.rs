//! HTTP response types and utilities
//!
//! This module provides the error envelope returned by every endpoint and the
//! mapping from [`AppError`] to HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, ParseError, SourceError, WebError};

/// Body returned by every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Client-facing error message
    pub error: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorResponse {
    pub fn new(message: String) -> Self {
        Self {
            success: false,
            error: message,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Status code and client-facing message for an error.
pub fn error_status(error: &AppError) -> (StatusCode, String) {
    match error {
        AppError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
        AppError::NotFound { resource, id } => (
            StatusCode::NOT_FOUND,
            format!("{} with id '{}' not found", resource, id),
        ),
        AppError::Parse(ParseError::Cancelled) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Playlist parsing was cancelled".to_string(),
        ),
        AppError::Parse(ParseError::Io(_)) => (
            StatusCode::BAD_REQUEST,
            "Failed to read playlist content".to_string(),
        ),
        AppError::Source(SourceError::InvalidUrl { message, .. }) => (
            StatusCode::BAD_REQUEST,
            format!("Invalid playlist URL: {}", message),
        ),
        AppError::Source(SourceError::TooLarge { max_bytes, .. })
        | AppError::Web(WebError::PayloadTooLarge {
            max_size: max_bytes,
        }) => (
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Playlist exceeds the {} byte limit", max_bytes),
        ),
        AppError::Source(SourceError::Timeout { .. }) => (
            StatusCode::GATEWAY_TIMEOUT,
            "Playlist source timed out".to_string(),
        ),
        AppError::Source(SourceError::Http { status, message }) => (
            StatusCode::BAD_GATEWAY,
            format!("Playlist source returned {} {}", status, message),
        ),
        AppError::Http(_) => (
            StatusCode::BAD_GATEWAY,
            "External service communication failed".to_string(),
        ),
        AppError::Web(WebError::InvalidRequest { field, message }) => (
            StatusCode::BAD_REQUEST,
            format!("Invalid request field '{}': {}", field, message),
        ),
        AppError::Web(WebError::Multipart(e)) => (StatusCode::BAD_REQUEST, e.body_text()),
        AppError::Configuration { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Configuration error: {}", message),
        ),
        AppError::Internal { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal error: {}", message),
        ),
    }
}

/// Convert AppError to appropriate HTTP response
pub fn handle_error(error: AppError) -> impl IntoResponse {
    let (status, message) = error_status(&error);
    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    } else {
        tracing::debug!("Request rejected ({}): {}", status, error);
    }

    (status, Json(ErrorResponse::new(message)))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        handle_error(self).into_response()
    }
}
