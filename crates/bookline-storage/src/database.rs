// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All access is serialized through tokio-rusqlite's single background
//! thread; the [`Database`] struct IS the single writer. Query modules
//! accept `&Database` and go through `connection().call()`. Do NOT create
//! additional Connection instances for writes.

use bookline_core::BooklineError;
use tokio_rusqlite::Connection;

/// Handle to the Bookline SQLite database.
///
/// Opening runs all pending migrations, then applies per-connection
/// PRAGMAs (foreign keys, busy timeout, and WAL when requested).
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path` and run migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, BooklineError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| BooklineError::Storage { source: Box::new(e) })?;
        }

        // Migrations run on a short-lived synchronous connection before the
        // async handle opens; refinery tracks applied migrations itself.
        {
            let mut conn = rusqlite::Connection::open(path).map_err(map_sql_err)?;
            crate::migrations::run_migrations(&mut conn)?;
        }

        let conn = Connection::open(path.to_string()).await.map_err(map_sql_err)?;
        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.execute_batch("PRAGMA synchronous = NORMAL; PRAGMA foreign_keys = ON;")?;
            conn.busy_timeout(std::time::Duration::from_millis(5000))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        tracing::debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint and close the connection.
    pub async fn close(self) -> Result<(), BooklineError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> BooklineError {
    BooklineError::Storage {
        source: Box::new(e),
    }
}

/// Map a bare rusqlite error into the workspace error type.
pub(crate) fn map_sql_err(e: rusqlite::Error) -> BooklineError {
    BooklineError::Storage {
        source: Box::new(e),
    }
}
