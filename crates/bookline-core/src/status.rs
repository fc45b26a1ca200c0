// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking-status derivation.
//!
//! Classifies a [`ConversationRecord`] into exactly one [`BookingStatus`]
//! using a fixed priority order so overlapping signals resolve predictably.
//! A completed booking is a terminal success fact and must not be masked by
//! a stale `needs_human` flag; an explicit escalation flag outranks a merely
//! in-progress stage.
//!
//! The status is derived on every read, never persisted -- a stored status
//! column could drift out of sync with the signal fields it summarizes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::types::ConversationRecord;

/// Discrete triage classification of a conversation, derived, never stored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// A booking exists for this conversation.
    Confirmed,
    /// The automation flagged the conversation for operator intervention.
    NeedsHuman,
    /// The automation recorded a failure and no booking exists.
    Error,
    /// The flow is on an active, non-terminal stage.
    InProgress,
    /// No booking, no escalation, no error, no active stage.
    Abandoned,
}

impl BookingStatus {
    /// Canonical ordering for filter dropdowns and inbox summaries.
    ///
    /// Matches the derivation priority: most actionable first.
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Confirmed,
        BookingStatus::NeedsHuman,
        BookingStatus::Error,
        BookingStatus::InProgress,
        BookingStatus::Abandoned,
    ];
}

/// Derive the display status for a conversation record.
///
/// Pure and total: every combination of field values (including all-null)
/// maps to exactly one status. Priority order, each check short-circuiting:
///
/// 1. `booking_id` set -> [`BookingStatus::Confirmed`]
/// 2. `needs_human` -> [`BookingStatus::NeedsHuman`]
/// 3. `last_error_code` set -> [`BookingStatus::Error`]
/// 4. `stage` set and non-terminal -> [`BookingStatus::InProgress`]
/// 5. otherwise -> [`BookingStatus::Abandoned`]
pub fn derive_booking_status(record: &ConversationRecord) -> BookingStatus {
    if record.booking_id.is_some() {
        return BookingStatus::Confirmed;
    }
    if record.needs_human {
        return BookingStatus::NeedsHuman;
    }
    if record.last_error_code.is_some() {
        return BookingStatus::Error;
    }
    match record.stage {
        Some(stage) if !stage.is_terminal() => BookingStatus::InProgress,
        _ => BookingStatus::Abandoned,
    }
}
