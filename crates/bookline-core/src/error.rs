// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Bookline inbox service.

use thiserror::Error;

/// The primary error type used across Bookline crates.
///
/// Callers must be able to distinguish "no matching rows" (an `Ok` with an
/// empty result) from a failed query (`Storage`), and a missing conversation
/// (`NotFound`) from one that exists with zero messages.
#[derive(Debug, Error)]
pub enum BooklineError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database unreachable, query failure, migration failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A requested resource does not exist.
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    /// Malformed request input, rejected before any query runs.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A write conflicted with existing state (e.g. a conversation already
    /// linked to a different booking).
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// HTTP server errors (bind failure, serve failure).
    #[error("server error: {message}")]
    Server {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BooklineError {
    /// Shorthand for a missing conversation.
    pub fn conversation_not_found(id: i64) -> Self {
        BooklineError::NotFound {
            resource: "conversation",
            id,
        }
    }
}
