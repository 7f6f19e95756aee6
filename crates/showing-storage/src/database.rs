// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use showing_config::model::StorageConfig;
use showing_core::ShowingError;
use tracing::{debug, info};

/// Connection settings applied when a database is opened.
#[derive(Debug, Clone, Copy)]
pub struct DatabaseOptions {
    pub wal_mode: bool,
    pub busy_timeout: Duration,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            wal_mode: true,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

impl From<&StorageConfig> for DatabaseOptions {
    fn from(config: &StorageConfig) -> Self {
        Self {
            wal_mode: config.wal_mode,
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
        }
    }
}

/// Handle to the single SQLite connection.
///
/// Cloning is cheap; every clone talks to the same background thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` with default options.
    pub async fn open(path: &str) -> Result<Self, ShowingError> {
        Self::open_with(path, DatabaseOptions::default()).await
    }

    /// Open the database, apply PRAGMAs and run pending migrations.
    ///
    /// `":memory:"` opens a private in-memory database.
    pub async fn open_with(path: &str, options: DatabaseOptions) -> Result<Self, ShowingError> {
        if path != ":memory:"
            && let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ShowingError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ShowingError::Storage {
                source: Box::new(e),
            })?;

        let applied = conn
            .call(move |conn| -> Result<Result<usize, ShowingError>, rusqlite::Error> {
                conn.busy_timeout(options.busy_timeout)?;
                if options.wal_mode {
                    let mode: String = conn.pragma_update_and_check(
                        None,
                        "journal_mode",
                        "WAL",
                        |row| row.get(0),
                    )?;
                    debug!(journal_mode = %mode, "journal mode set");
                }
                conn.pragma_update(None, "synchronous", "NORMAL")?;
                conn.pragma_update(None, "foreign_keys", "ON")?;
                Ok(crate::migrations::run_migrations(conn))
            })
            .await
            .map_err(map_tr_err)??;

        info!(path, applied, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), ShowingError> {
        checkpoint(&self).await?;
        self.conn.close().await.map_err(|e| ShowingError::Storage {
            source: Box::new(e),
        })
    }
}

/// Fold the WAL back into the main database file.
pub async fn checkpoint(db: &Database) -> Result<(), ShowingError> {
    db.connection()
        .call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
    debug!("WAL checkpoint complete");
    Ok(())
}

/// Map a tokio-rusqlite error into the crate-wide storage error.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ShowingError {
    ShowingError::Storage {
        source: Box::new(e),
    }
}
