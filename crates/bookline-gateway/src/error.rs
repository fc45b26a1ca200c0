// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error-to-HTTP mapping for the gateway.
//!
//! "No matching rows" is a 200 with an empty page; a failed query is a 503.
//! The two must never be conflated in what the operator sees.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use bookline_core::BooklineError;

/// JSON error body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable machine-readable error code.
    pub code: &'static str,
    /// Human-readable description.
    pub error: String,
}

/// Wrapper making [`BooklineError`] an axum response.
pub struct ApiError(pub BooklineError);

impl From<BooklineError> for ApiError {
    fn from(err: BooklineError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            BooklineError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            BooklineError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            BooklineError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
            BooklineError::Storage { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "data_source_unavailable")
            }
            BooklineError::Config(_)
            | BooklineError::Server { .. }
            | BooklineError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, %status, "request failed");
        }

        (
            status,
            Json(ErrorResponse {
                code,
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
