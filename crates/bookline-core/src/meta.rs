// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status and stage display metadata.
//!
//! Every rendering surface (badges, filters, tooltips) reads labels and
//! style classes from here so status semantics never drift between views.
//! The registries are exhaustive matches over closed enums: adding a variant
//! without metadata is a compile error, not a runtime fallback.

use crate::status::BookingStatus;
use crate::types::BookingStage;

/// Display metadata for one booking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMeta {
    /// Human-readable badge label.
    pub label: &'static str,
    /// CSS class consumed by the operator UI.
    pub style_class: &'static str,
}

impl BookingStatus {
    /// Display metadata for this status.
    pub fn meta(self) -> StatusMeta {
        match self {
            BookingStatus::Confirmed => StatusMeta {
                label: "Confirmed",
                style_class: "status-confirmed",
            },
            BookingStatus::NeedsHuman => StatusMeta {
                label: "Needs human",
                style_class: "status-needs-human",
            },
            BookingStatus::Error => StatusMeta {
                label: "Error",
                style_class: "status-error",
            },
            BookingStatus::InProgress => StatusMeta {
                label: "In progress",
                style_class: "status-in-progress",
            },
            BookingStatus::Abandoned => StatusMeta {
                label: "Abandoned",
                style_class: "status-abandoned",
            },
        }
    }
}

impl BookingStage {
    /// Human-readable label for this stage.
    pub fn label(self) -> &'static str {
        match self {
            BookingStage::SelectingService => "Selecting service",
            BookingStage::ConfirmingAddress => "Confirming address",
            BookingStage::AskAddress => "Asking for address",
            BookingStage::ChoosingSlot => "Choosing a slot",
            BookingStage::AwaitingConfirm => "Awaiting confirmation",
            BookingStage::CreatingBooking => "Creating booking",
            BookingStage::CalendarInsert => "Writing calendar event",
            BookingStage::OfferingUpsells => "Offering upsells",
            BookingStage::EmailCollection => "Collecting email",
            BookingStage::Booked => "Booked",
            BookingStage::Completed => "Completed",
        }
    }
}
