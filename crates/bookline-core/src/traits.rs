// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait implemented by the persistence layer.
//!
//! The gateway depends on this trait rather than on a concrete store, so
//! handlers can be exercised against any backend.

use async_trait::async_trait;

use crate::error::BooklineError;
use crate::types::{ConversationDetail, InboxFilter, InboxPage};

/// Read/triage operations over the conversation store.
///
/// All reads observe a consistent snapshot per call. The only mutating
/// operation is [`link_booking`](InboxStore::link_booking).
#[async_trait]
pub trait InboxStore: Send + Sync {
    /// Filtered, paginated inbox view, most recent activity first.
    ///
    /// `page` is 1-indexed. Two calls with identical arguments against an
    /// unchanged store return identical results.
    async fn query_inbox(
        &self,
        filter: &InboxFilter,
        page: u32,
        limit: u32,
    ) -> Result<InboxPage, BooklineError>;

    /// Consolidated detail view of one conversation.
    ///
    /// Returns [`BooklineError::NotFound`] when the conversation does not
    /// exist -- distinct from an existing conversation with zero messages.
    async fn conversation_detail(&self, id: i64) -> Result<ConversationDetail, BooklineError>;

    /// Associate a manually created booking with a conversation.
    ///
    /// Idempotent: re-linking the same `booking_id` is a no-op success and
    /// returns `false`. Linking a different booking to an already-linked
    /// conversation is a [`BooklineError::Conflict`]. Returns `true` when
    /// the link was newly written.
    async fn link_booking(
        &self,
        id: i64,
        booking_id: i64,
        calendar_event_id: Option<String>,
    ) -> Result<bool, BooklineError>;

    /// Cheap liveness probe against the underlying store.
    async fn health_check(&self) -> Result<(), BooklineError>;
}
