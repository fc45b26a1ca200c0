// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the InboxStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use bookline_config::model::StorageConfig;
use bookline_core::types::{ConversationDetail, InboxFilter, InboxPage};
use bookline_core::{BooklineError, InboxStore};

use crate::database::Database;
use crate::queries;

/// SQLite-backed inbox store.
///
/// Wraps a [`Database`] handle and delegates all operations to the typed
/// query modules. The database is lazily opened on the first call to
/// [`SqliteStorage::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`](Self::initialize)
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database, running migrations if needed.
    pub async fn initialize(&self) -> Result<(), BooklineError> {
        self.db
            .get_or_try_init(|| async {
                debug!(path = %self.config.database_path, "initializing sqlite storage");
                Database::open(&self.config.database_path, self.config.wal_mode).await
            })
            .await?;
        Ok(())
    }

    /// Returns the underlying Database, or an error if not initialized.
    ///
    /// The automation's write path and test seeding go through this handle
    /// via the `queries` modules; the triage read surface stays behind the
    /// [`InboxStore`] trait.
    pub fn database(&self) -> Result<&Database, BooklineError> {
        self.db.get().ok_or_else(|| BooklineError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl InboxStore for SqliteStorage {
    async fn query_inbox(
        &self,
        filter: &InboxFilter,
        page: u32,
        limit: u32,
    ) -> Result<InboxPage, BooklineError> {
        queries::inbox::query_inbox(self.database()?, filter, page, limit).await
    }

    async fn conversation_detail(&self, id: i64) -> Result<ConversationDetail, BooklineError> {
        queries::conversations::conversation_detail(self.database()?, id).await
    }

    async fn link_booking(
        &self,
        id: i64,
        booking_id: i64,
        calendar_event_id: Option<String>,
    ) -> Result<bool, BooklineError> {
        queries::conversations::link_booking(self.database()?, id, booking_id, calendar_event_id.as_deref())
            .await
    }

    async fn health_check(&self) -> Result<(), BooklineError> {
        self.database()?
            .connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
    }
}
