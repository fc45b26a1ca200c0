// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `InboxHarness` assembles a real SQLite store on a temp file plus the
//! gateway router over it, and exposes seeding helpers that write through
//! the same single-writer connection the service uses. Each harness is
//! fully isolated; tests are independent and order-insensitive.

use std::sync::Arc;
use std::time::Instant;

use bookline_config::model::StorageConfig;
use bookline_core::types::{BookingStage, SenderRole};
use bookline_core::BooklineError;
use bookline_gateway::{build_router, AuthConfig, GatewayState, PageLimits};
use bookline_storage::queries;
use bookline_storage::{Database, NewConversation, SqliteStorage};

/// Bearer token the harness router accepts.
pub const TEST_BEARER_TOKEN: &str = "test-token";

/// A complete service stack over an isolated temp database.
pub struct InboxHarness {
    /// The store serving the router, also used for seeding.
    pub storage: Arc<SqliteStorage>,
    _dir: tempfile::TempDir,
}

impl InboxHarness {
    /// Create a harness with an empty database.
    pub async fn new() -> Result<Self, BooklineError> {
        let dir = tempfile::TempDir::new()
            .map_err(|e| BooklineError::Storage { source: e.into() })?;
        let config = StorageConfig {
            database_path: dir
                .path()
                .join("harness.db")
                .to_string_lossy()
                .into_owned(),
            wal_mode: true,
        };

        let storage = Arc::new(SqliteStorage::new(config));
        storage.initialize().await?;

        Ok(Self {
            storage,
            _dir: dir,
        })
    }

    /// Build a router over this harness's store, authenticated with
    /// [`TEST_BEARER_TOKEN`] and default pagination limits.
    pub fn router(&self) -> axum::Router {
        self.router_with_limits(PageLimits {
            default_limit: 25,
            max_limit: 100,
        })
    }

    /// Build a router with explicit pagination limits.
    pub fn router_with_limits(&self, page_limits: PageLimits) -> axum::Router {
        build_router(GatewayState {
            store: self.storage.clone(),
            auth: AuthConfig {
                bearer_token: Some(TEST_BEARER_TOKEN.to_string()),
            },
            page_limits,
            started_at: Instant::now(),
        })
    }

    /// The underlying database handle for direct seeding.
    pub fn db(&self) -> &Database {
        self.storage
            .database()
            .expect("harness storage initialized in new()")
    }

    /// Seed one conversation row. Returns the assigned id.
    pub async fn seed_conversation(&self, new: &NewConversation) -> Result<i64, BooklineError> {
        queries::conversations::insert_conversation(self.db(), new).await
    }

    /// Seed a conversation mid-flow on the given stage with one activity
    /// timestamp -- the common starting point for triage scenarios.
    pub async fn seed_in_progress(
        &self,
        phone: &str,
        stage: BookingStage,
        last_message_at: &str,
    ) -> Result<i64, BooklineError> {
        self.seed_conversation(&NewConversation {
            phone: Some(phone.to_string()),
            stage: Some(stage),
            last_message_at: Some(last_message_at.to_string()),
            ..NewConversation::default()
        })
        .await
    }

    /// Seed one SMS on a conversation.
    pub async fn seed_message(
        &self,
        conversation_id: i64,
        sender_role: SenderRole,
        body: &str,
        sent_at: &str,
    ) -> Result<i64, BooklineError> {
        queries::messages::record_message(self.db(), conversation_id, sender_role, body, sent_at)
            .await
    }

    /// Seed a customer profile. Returns the assigned id.
    pub async fn seed_customer(
        &self,
        name: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<i64, BooklineError> {
        queries::customers::insert_customer(self.db(), name, phone, email).await
    }

    /// Seed or replace a conversation's booking draft.
    pub async fn seed_draft(
        &self,
        conversation_id: i64,
        service: Option<&str>,
        address: Option<&str>,
        slot_start: Option<&str>,
    ) -> Result<(), BooklineError> {
        queries::customers::upsert_booking_draft(
            self.db(),
            conversation_id,
            service,
            address,
            slot_start,
        )
        .await
    }
}
