// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The filtered, paginated inbox view.
//!
//! The status filter matches the *derived* status, which is never stored:
//! each status value compiles to a SQL predicate mirroring the derivation
//! priority table exactly, and returned rows are annotated by running the
//! real derivation over the fetched record. A test asserts the two stay in
//! agreement.

use bookline_core::types::parse_rfc3339;
use bookline_core::{
    derive_booking_status, BookingStatus, BooklineError, InboxEntry, InboxFilter, InboxPage,
};
use rusqlite::params_from_iter;
use rusqlite::types::Value;

use crate::database::Database;
use crate::models::BookingStage;
use crate::queries::conversations::{conversation_from_row, CONVERSATION_COLUMNS};

/// Query one page of the inbox, most recent activity first.
///
/// `page` is 1-indexed; `limit` is the page size. Ordering is
/// `last_message_at DESC` with ties broken by `id DESC`, so pagination is
/// stable against an unchanged store. `total_count` counts the filtered set
/// before pagination.
pub async fn query_inbox(
    db: &Database,
    filter: &InboxFilter,
    page: u32,
    limit: u32,
) -> Result<InboxPage, BooklineError> {
    filter.validate()?;
    if page == 0 {
        return Err(BooklineError::Validation("page must be >= 1".into()));
    }
    if limit == 0 {
        return Err(BooklineError::Validation("limit must be >= 1".into()));
    }

    let (where_sql, params) = build_where(filter);
    let offset = i64::from(page - 1) * i64::from(limit);
    let limit = i64::from(limit);

    db.connection()
        .call(move |conn| {
            let count_sql = format!("SELECT COUNT(*) FROM conversations{where_sql}");
            let total_count: i64 =
                conn.query_row(&count_sql, params_from_iter(params.iter()), |row| row.get(0))?;

            let rows_sql = format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations{where_sql}
                 ORDER BY last_message_at DESC, id DESC
                 LIMIT ? OFFSET ?"
            );
            let mut row_params = params.clone();
            row_params.push(Value::Integer(limit));
            row_params.push(Value::Integer(offset));

            let mut stmt = conn.prepare(&rows_sql)?;
            let mapped = stmt.query_map(params_from_iter(row_params.iter()), |row| {
                let conversation = conversation_from_row(row)?;
                let status = derive_booking_status(&conversation);
                Ok(InboxEntry {
                    conversation,
                    status,
                })
            })?;

            let mut rows = Vec::new();
            for row in mapped {
                rows.push(row?);
            }

            Ok(InboxPage {
                rows,
                total_count: total_count as u64,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Build the WHERE clause and its positional parameters for a filter.
///
/// All criteria are AND-combined. Returns an empty string when no filter is
/// set.
fn build_where(filter: &InboxFilter) -> (String, Vec<Value>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(status) = filter.status {
        clauses.push(status_predicate(status));
    }
    if let Some(stage) = filter.stage {
        clauses.push("stage = ?".into());
        params.push(Value::Text(stage.to_string()));
    }
    if let Some(needs_human) = filter.needs_human {
        clauses.push("needs_human = ?".into());
        params.push(Value::Integer(i64::from(needs_human)));
    }
    if let Some(phone) = &filter.phone {
        clauses.push("phone LIKE '%' || ? || '%'".into());
        params.push(Value::Text(phone.clone()));
    }
    if let Some(booking_id) = filter.booking_id {
        clauses.push("booking_id = ?".into());
        params.push(Value::Integer(booking_id));
    }
    if let Some(from) = &filter.date_from {
        clauses.push("last_message_at >= ?".into());
        params.push(Value::Text(canonical_bound(from)));
    }
    if let Some(to) = &filter.date_to {
        clauses.push("last_message_at <= ?".into());
        params.push(Value::Text(canonical_bound(to)));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    (where_sql, params)
}

/// Normalize a validated RFC 3339 bound to the stored timestamp format, so
/// lexicographic comparison in SQL is chronological regardless of how the
/// caller spelled the offset or sub-second precision.
fn canonical_bound(ts: &str) -> String {
    match parse_rfc3339(ts) {
        Ok(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        // Unreachable after validate(); fall back to the raw text.
        Err(_) => ts.to_string(),
    }
}

/// SQL predicate equivalent to `derive_booking_status(row) == status`.
///
/// Mirrors the derivation priority order: each predicate excludes every
/// higher-priority condition. `stage NOT IN (active)` covers terminal and
/// unrecognized stage text, matching the record mapper's treatment of
/// unknown stages.
fn status_predicate(status: BookingStatus) -> String {
    let active = || {
        BookingStage::active_stages()
            .map(|s| format!("'{s}'"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    match status {
        BookingStatus::Confirmed => "booking_id IS NOT NULL".to_string(),
        BookingStatus::NeedsHuman => "booking_id IS NULL AND needs_human = 1".to_string(),
        BookingStatus::Error => {
            "booking_id IS NULL AND needs_human = 0 AND last_error_code IS NOT NULL".to_string()
        }
        BookingStatus::InProgress => format!(
            "booking_id IS NULL AND needs_human = 0 AND last_error_code IS NULL \
             AND stage IN ({})",
            active()
        ),
        BookingStatus::Abandoned => format!(
            "booking_id IS NULL AND needs_human = 0 AND last_error_code IS NULL \
             AND (stage IS NULL OR stage NOT IN ({}))",
            active()
        ),
    }
}
