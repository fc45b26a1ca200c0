// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Bookline inbox service.
//!
//! This crate provides the error type, domain types, the booking-status
//! derivation engine, the status metadata registry, and the storage trait
//! implemented by the persistence layer. It holds no I/O of its own.

pub mod error;
pub mod meta;
pub mod status;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::BooklineError;
pub use meta::StatusMeta;
pub use status::{derive_booking_status, BookingStatus};
pub use traits::InboxStore;
pub use types::{
    BookingDraft, BookingStage, ConversationDetail, ConversationRecord, Customer, InboxEntry,
    InboxFilter, InboxPage, SenderRole, SmsMessage,
};
