// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS thread operations.
//!
//! Recording a message also advances the conversation's activity
//! timestamps in the same transaction, so inbox ordering always reflects
//! the thread.

use std::str::FromStr;

use bookline_core::BooklineError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::{SenderRole, SmsMessage};

/// Record one SMS on a conversation. Returns the assigned message id.
///
/// Updates `last_message_at` and the direction-specific activity timestamp
/// on the conversation row atomically with the insert.
pub async fn record_message(
    db: &Database,
    conversation_id: i64,
    sender_role: SenderRole,
    body: &str,
    sent_at: &str,
) -> Result<i64, BooklineError> {
    let body = body.to_string();
    let sent_at = sent_at.to_string();
    let message_id = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let exists: Option<i64> = tx
                .query_row(
                    "SELECT id FROM conversations WHERE id = ?1",
                    params![conversation_id],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                tx.commit()?;
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO sms_messages (conversation_id, sender_role, body, sent_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![conversation_id, sender_role.to_string(), body, sent_at],
            )?;
            let message_id = tx.last_insert_rowid();

            let direction_column = match sender_role {
                SenderRole::Customer => "last_inbound_at",
                SenderRole::Business => "last_outbound_at",
            };
            tx.execute(
                &format!(
                    "UPDATE conversations SET {direction_column} = ?1, last_message_at = ?1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?2"
                ),
                params![sent_at, conversation_id],
            )?;

            tx.commit()?;
            Ok(Some(message_id))
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    message_id.ok_or_else(|| BooklineError::conversation_not_found(conversation_id))
}

/// All messages of a conversation, oldest first (ties by message id).
pub async fn messages_for_conversation(
    db: &Database,
    conversation_id: i64,
) -> Result<Vec<SmsMessage>, BooklineError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, sender_role, body, sent_at
                 FROM sms_messages WHERE conversation_id = ?1
                 ORDER BY sent_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![conversation_id], |row| {
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

            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
