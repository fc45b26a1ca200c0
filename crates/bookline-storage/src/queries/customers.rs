// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer profiles and in-flight booking drafts.

use bookline_core::BooklineError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::{BookingDraft, Customer};

/// Insert a customer profile. Returns the assigned id.
pub async fn insert_customer(
    db: &Database,
    name: Option<&str>,
    phone: Option<&str>,
    email: Option<&str>,
) -> Result<i64, BooklineError> {
    let name = name.map(|s| s.to_string());
    let phone = phone.map(|s| s.to_string());
    let email = email.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO customers (name, phone, email) VALUES (?1, ?2, ?3)",
                params![name, phone, email],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a customer profile by id.
pub async fn get_customer(db: &Database, id: i64) -> Result<Option<Customer>, BooklineError> {
    db.connection()
        .call(move |conn| {
            let customer = conn
                .query_row(
                    "SELECT id, name, phone, email, created_at FROM customers WHERE id = ?1",
                    params![id],
                    |row| {
                        Ok(Customer {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            phone: row.get(2)?,
                            email: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(customer)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Create or replace the in-flight booking draft for a conversation.
///
/// The automation overwrites the draft as the customer settles on a
/// service, address, and slot; one draft per conversation.
pub async fn upsert_booking_draft(
    db: &Database,
    conversation_id: i64,
    service: Option<&str>,
    address: Option<&str>,
    slot_start: Option<&str>,
) -> Result<(), BooklineError> {
    let service = service.map(|s| s.to_string());
    let address = address.map(|s| s.to_string());
    let slot_start = slot_start.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO booking_drafts (conversation_id, service, address, slot_start)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (conversation_id) DO UPDATE SET
                     service = excluded.service,
                     address = excluded.address,
                     slot_start = excluded.slot_start,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![conversation_id, service, address, slot_start],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the in-flight booking draft for a conversation, if any.
pub async fn get_booking_draft(
    db: &Database,
    conversation_id: i64,
) -> Result<Option<BookingDraft>, BooklineError> {
    db.connection()
        .call(move |conn| {
            let draft = conn
                .query_row(
                    "SELECT conversation_id, service, address, slot_start, updated_at
                     FROM booking_drafts WHERE conversation_id = ?1",
                    params![conversation_id],
                    |row| {
                        Ok(BookingDraft {
                            conversation_id: row.get(0)?,
                            service: row.get(1)?,
                            address: row.get(2)?,
                            slot_start: row.get(3)?,
                            updated_at: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(draft)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
