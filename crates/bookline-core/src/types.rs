// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Bookline workspace.
//!
//! All timestamps are RFC 3339 UTC strings (`%Y-%m-%dT%H:%M:%fZ`), so that
//! lexicographic comparison in SQL equals chronological comparison.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::BooklineError;

/// The automation's current step within a booking conversation.
///
/// Stored as TEXT; unrecognized values read back from the store map to
/// `None` on the record so status derivation stays total.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStage {
    SelectingService,
    ConfirmingAddress,
    AskAddress,
    ChoosingSlot,
    AwaitingConfirm,
    CreatingBooking,
    CalendarInsert,
    OfferingUpsells,
    EmailCollection,
    Booked,
    Completed,
}

impl BookingStage {
    /// Terminal stages mark a flow that has run to completion; a conversation
    /// sitting on one without a linked booking is no longer "in progress".
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStage::Booked | BookingStage::Completed)
    }

    /// All non-terminal stages, in declaration order.
    pub fn active_stages() -> impl Iterator<Item = BookingStage> {
        BookingStage::iter().filter(|s| !s.is_terminal())
    }
}

/// Who sent a message within a conversation thread.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    /// The customer texting in.
    Customer,
    /// The business side -- either the automation or an operator.
    Business,
}

/// One row per SMS conversation attempting a booking.
///
/// Produced and mutated by the upstream automation; this service reads
/// snapshots of it. `booking_id` being set is a terminal success fact that
/// overrides every in-progress signal (see [`crate::status`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: i64,
    pub phone: Option<String>,
    pub customer_name: Option<String>,
    pub customer_id: Option<i64>,
    /// The in-progress booking intent.
    pub service: Option<String>,
    pub requested_datetime: Option<String>,
    pub stage: Option<BookingStage>,
    pub stage_reason: Option<String>,
    /// Set by the automation when it cannot proceed without an operator.
    pub needs_human: bool,
    pub needs_human_reason: Option<String>,
    /// Last automation failure; all three are set together.
    pub last_error_code: Option<String>,
    pub last_error_message: Option<String>,
    pub last_error_at: Option<String>,
    /// Present once a booking was actually created.
    pub booking_id: Option<i64>,
    pub calendar_event_id: Option<String>,
    pub last_inbound_at: Option<String>,
    pub last_outbound_at: Option<String>,
    pub last_message_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One SMS within a conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_role: SenderRole,
    pub body: String,
    pub sent_at: String,
}

/// In-flight candidate booking state, before a booking is finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub conversation_id: i64,
    pub service: Option<String>,
    pub address: Option<String>,
    pub slot_start: Option<String>,
    pub updated_at: String,
}

/// Resolved customer profile associated with a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: String,
}

/// Consolidated view of one conversation for operator triage.
///
/// Assembled in a single storage snapshot; `messages` is fully materialized
/// and ordered ascending by `sent_at` (ties by message id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationDetail {
    pub conversation: ConversationRecord,
    pub messages: Vec<SmsMessage>,
    pub booking_draft: Option<BookingDraft>,
    pub customer: Option<Customer>,
}

/// Inbox filter criteria. All fields optional, AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboxFilter {
    /// Matches the derived status, not a stored column.
    pub status: Option<crate::status::BookingStatus>,
    pub stage: Option<BookingStage>,
    pub needs_human: Option<bool>,
    /// Substring match on the phone number.
    pub phone: Option<String>,
    pub booking_id: Option<i64>,
    /// Inclusive lower bound on `last_message_at`, RFC 3339.
    pub date_from: Option<String>,
    /// Inclusive upper bound on `last_message_at`, RFC 3339.
    pub date_to: Option<String>,
}

impl InboxFilter {
    /// Reject malformed filters before any query runs.
    ///
    /// An inverted or unparseable date range is a [`BooklineError::Validation`],
    /// never a silent zero-row result.
    pub fn validate(&self) -> Result<(), BooklineError> {
        let from = self
            .date_from
            .as_deref()
            .map(parse_rfc3339)
            .transpose()
            .map_err(|e| BooklineError::Validation(format!("date_from: {e}")))?;
        let to = self
            .date_to
            .as_deref()
            .map(parse_rfc3339)
            .transpose()
            .map_err(|e| BooklineError::Validation(format!("date_to: {e}")))?;

        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(BooklineError::Validation(format!(
                "date_from {} is after date_to {}",
                self.date_from.as_deref().unwrap_or_default(),
                self.date_to.as_deref().unwrap_or_default(),
            )));
        }
        Ok(())
    }
}

/// Parse an RFC 3339 timestamp into a UTC instant.
pub fn parse_rfc3339(value: &str) -> Result<chrono::DateTime<chrono::Utc>, String> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| format!("`{value}` is not a valid RFC 3339 timestamp ({e})"))
}

/// One inbox row: the raw record annotated with its derived status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxEntry {
    pub conversation: ConversationRecord,
    pub status: crate::status::BookingStatus,
}

/// One page of the filtered inbox.
///
/// `total_count` counts the filtered set before pagination, so callers can
/// compute total pages as `ceil(total_count / limit)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxPage {
    pub rows: Vec<InboxEntry>,
    pub total_count: u64,
}
