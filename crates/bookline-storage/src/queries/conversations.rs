// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation row operations: inserts and updates for the automation's
//! write path, the consolidated detail projection, and the booking link
//! recovery action.

use std::str::FromStr;

use bookline_core::BooklineError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::{
    BookingDraft, BookingStage, ConversationDetail, ConversationRecord, Customer, NewConversation,
    SenderRole, SmsMessage,
};

/// Column list matching [`conversation_from_row`]. Keep the two in sync.
pub(crate) const CONVERSATION_COLUMNS: &str = "id, phone, customer_name, customer_id, service, \
     requested_datetime, stage, stage_reason, needs_human, needs_human_reason, \
     last_error_code, last_error_message, last_error_at, booking_id, calendar_event_id, \
     last_inbound_at, last_outbound_at, last_message_at, created_at, updated_at";

/// Map a row selected with [`CONVERSATION_COLUMNS`] into a record.
///
/// Unrecognized stage text maps to `None` so status derivation stays total
/// even when the automation writes a stage this build does not know.
pub(crate) fn conversation_from_row(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<ConversationRecord> {
    let stage_text: Option<String> = row.get(6)?;
    let stage = stage_text.as_deref().and_then(|text| {
        BookingStage::from_str(text)
            .inspect_err(|_| tracing::warn!(stage = text, "unrecognized stage text in store"))
            .ok()
    });

    Ok(ConversationRecord {
        id: row.get(0)?,
        phone: row.get(1)?,
        customer_name: row.get(2)?,
        customer_id: row.get(3)?,
        service: row.get(4)?,
        requested_datetime: row.get(5)?,
        stage,
        stage_reason: row.get(7)?,
        needs_human: row.get(8)?,
        needs_human_reason: row.get(9)?,
        last_error_code: row.get(10)?,
        last_error_message: row.get(11)?,
        last_error_at: row.get(12)?,
        booking_id: row.get(13)?,
        calendar_event_id: row.get(14)?,
        last_inbound_at: row.get(15)?,
        last_outbound_at: row.get(16)?,
        last_message_at: row.get(17)?,
        created_at: row.get(18)?,
        updated_at: row.get(19)?,
    })
}

/// Insert a new conversation row. Returns the assigned id.
pub async fn insert_conversation(
    db: &Database,
    new: &NewConversation,
) -> Result<i64, BooklineError> {
    let new = new.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations (
                     phone, customer_name, customer_id, service, requested_datetime,
                     stage, stage_reason, needs_human, needs_human_reason,
                     last_error_code, last_error_message, last_error_at,
                     booking_id, calendar_event_id,
                     last_inbound_at, last_outbound_at, last_message_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    new.phone,
                    new.customer_name,
                    new.customer_id,
                    new.service,
                    new.requested_datetime,
                    new.stage.map(|s| s.to_string()),
                    new.stage_reason,
                    new.needs_human,
                    new.needs_human_reason,
                    new.last_error_code,
                    new.last_error_message,
                    new.last_error_at,
                    new.booking_id,
                    new.calendar_event_id,
                    new.last_inbound_at,
                    new.last_outbound_at,
                    new.last_message_at,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get one conversation by id.
pub async fn get_conversation(
    db: &Database,
    id: i64,
) -> Result<Option<ConversationRecord>, BooklineError> {
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1");
            let record = conn
                .query_row(&sql, params![id], conversation_from_row)
                .optional()?;
            Ok(record)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Advance a conversation to a new stage (automation write path).
pub async fn update_stage(
    db: &Database,
    id: i64,
    stage: BookingStage,
    reason: Option<&str>,
) -> Result<(), BooklineError> {
    let reason = reason.map(|r| r.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET stage = ?1, stage_reason = ?2,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?3",
                params![stage.to_string(), reason, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flag a conversation for operator intervention (automation write path).
pub async fn set_needs_human(
    db: &Database,
    id: i64,
    reason: Option<&str>,
) -> Result<(), BooklineError> {
    let reason = reason.map(|r| r.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET needs_human = 1, needs_human_reason = ?1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![reason, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record an automation failure on a conversation (automation write path).
///
/// The three `last_error_*` columns are always written together.
pub async fn record_error(
    db: &Database,
    id: i64,
    code: &str,
    message: &str,
) -> Result<(), BooklineError> {
    let code = code.to_string();
    let message = message.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET
                 last_error_code = ?1, last_error_message = ?2,
                 last_error_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?3",
                params![code, message, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

enum LinkOutcome {
    Linked,
    AlreadyLinked,
    NotFound,
    Conflict { existing: i64 },
}

/// Associate a manually created booking with a conversation.
///
/// Idempotent: re-linking the same `booking_id` is a no-op success and
/// returns `false`. Linking a different booking to an already-linked
/// conversation is a conflict -- two operators racing to rescue the same
/// conversation must not silently overwrite each other. Returns `true`
/// when the link was newly written.
pub async fn link_booking(
    db: &Database,
    id: i64,
    booking_id: i64,
    calendar_event_id: Option<&str>,
) -> Result<bool, BooklineError> {
    let calendar_event_id = calendar_event_id.map(|c| c.to_string());
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing: Option<Option<i64>> = tx
                .query_row(
                    "SELECT booking_id FROM conversations WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;

            let outcome = match existing {
                None => LinkOutcome::NotFound,
                Some(Some(current)) if current == booking_id => LinkOutcome::AlreadyLinked,
                Some(Some(current)) => LinkOutcome::Conflict { existing: current },
                Some(None) => {
                    tx.execute(
                        "UPDATE conversations SET booking_id = ?1, calendar_event_id = ?2,
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?3",
                        params![booking_id, calendar_event_id, id],
                    )?;
                    LinkOutcome::Linked
                }
            };

            tx.commit()?;
            Ok(outcome)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match outcome {
        LinkOutcome::Linked => Ok(true),
        LinkOutcome::AlreadyLinked => Ok(false),
        LinkOutcome::NotFound => Err(BooklineError::conversation_not_found(id)),
        LinkOutcome::Conflict { existing } => Err(BooklineError::Conflict {
            message: format!(
                "conversation {id} is already linked to booking {existing}, refusing to relink to {booking_id}"
            ),
        }),
    }
}

/// Assemble the consolidated detail view of one conversation.
///
/// All four reads happen in a single `call`, so the projection is one
/// consistent snapshot. Returns `NotFound` when the conversation does not
/// exist -- distinct from an existing conversation with zero messages.
pub async fn conversation_detail(
    db: &Database,
    id: i64,
) -> Result<ConversationDetail, BooklineError> {
    let detail = db
        .connection()
        .call(move |conn| {
            let sql = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1");
            let conversation = conn
                .query_row(&sql, params![id], conversation_from_row)
                .optional()?;

            let Some(conversation) = conversation else {
                return Ok(None);
            };

            let mut messages = Vec::new();
            {
                let mut stmt = conn.prepare(
                    "SELECT id, conversation_id, sender_role, body, sent_at
                     FROM sms_messages WHERE conversation_id = ?1
                     ORDER BY sent_at ASC, id ASC",
                )?;
                let rows = stmt.query_map(params![id], |row| {
                    let role_text: String = row.get(2)?;
                    let sender_role = SenderRole::from_str(&role_text).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            2,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                    Ok(SmsMessage {
                        id: row.get(0)?,
                        conversation_id: row.get(1)?,
                        sender_role,
                        body: row.get(3)?,
                        sent_at: row.get(4)?,
                    })
                })?;
                for row in rows {
                    messages.push(row?);
                }
            }

            let booking_draft = conn
                .query_row(
                    "SELECT conversation_id, service, address, slot_start, updated_at
                     FROM booking_drafts WHERE conversation_id = ?1",
                    params![id],
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

            let customer = match conversation.customer_id {
                Some(customer_id) => conn
                    .query_row(
                        "SELECT id, name, phone, email, created_at
                         FROM customers WHERE id = ?1",
                        params![customer_id],
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
                    .optional()?,
                None => None,
            };

            Ok(Some(ConversationDetail {
                conversation,
                messages,
                booking_draft,
                customer,
            }))
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    detail.ok_or_else(|| BooklineError::conversation_not_found(id))
}
