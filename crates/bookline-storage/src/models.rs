// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `bookline-core::types` for use across
//! the workspace. This module re-exports them for convenience within the
//! storage crate and adds the storage-only insert shapes.

pub use bookline_core::types::{
    BookingDraft, BookingStage, ConversationDetail, ConversationRecord, Customer, SenderRole,
    SmsMessage,
};

/// Fields for inserting a new conversation row.
///
/// The row id is assigned by the store; `created_at`/`updated_at` default to
/// the insert time. Used by the upstream automation's write path and by
/// test seeding.
#[derive(Debug, Clone, Default)]
pub struct NewConversation {
    pub phone: Option<String>,
    pub customer_name: Option<String>,
    pub customer_id: Option<i64>,
    pub service: Option<String>,
    pub requested_datetime: Option<String>,
    pub stage: Option<BookingStage>,
    pub stage_reason: Option<String>,
    pub needs_human: bool,
    pub needs_human_reason: Option<String>,
    pub last_error_code: Option<String>,
    pub last_error_message: Option<String>,
    pub last_error_at: Option<String>,
    pub booking_id: Option<i64>,
    pub calendar_event_id: Option<String>,
    pub last_inbound_at: Option<String>,
    pub last_outbound_at: Option<String>,
    pub last_message_at: Option<String>,
}
