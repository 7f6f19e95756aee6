// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary and applied
//! every time a [`Database`](crate::Database) is opened.

use showing_core::ShowingError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply all pending migrations, returning how many ran.
///
/// Refinery tracks applied migrations in its own `refinery_schema_history` table.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<usize, ShowingError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| ShowingError::Storage {
            source: Box::new(e),
        })?;
    Ok(report.applied_migrations().len())
}
