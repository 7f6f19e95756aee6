// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Showing appointment engine.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and deadline-bounded transactions
//! that re-check conflicts and allocate queue positions atomically.

pub mod adapter;
pub mod database;
pub mod migrations;
pub(crate) mod models;
pub mod queries;
pub(crate) mod writer;

pub use adapter::SqliteStorage;
pub use database::{Database, DatabaseOptions};

#[cfg(test)]
pub(crate) mod testing {
    use std::time::Duration;

    use chrono::{NaiveDate, NaiveTime, Utc};
    use showing_core::{Assignment, Deadline, NewAppointment, Operator, TimeWindow};
    use tempfile::{TempDir, tempdir};

    use crate::Database;

    pub(crate) async fn setup_db() -> (Database, TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    /// A Monday.
    pub(crate) fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()
    }

    pub(crate) fn window(hour: u32, minute: u32, minutes: u32) -> TimeWindow {
        TimeWindow::starting_at(day(), NaiveTime::from_hms_opt(hour, minute, 0).unwrap(), minutes)
            .unwrap()
    }

    pub(crate) fn booking(
        code: &str,
        user_id: i64,
        window: TimeWindow,
        assignment: Assignment,
    ) -> NewAppointment {
        NewAppointment {
            appointment_code: code.to_string(),
            user_id,
            store_id: 1,
            window,
            customer_name: format!("Customer {user_id}"),
            customer_phone: "555-0100".to_string(),
            requirements: None,
            assignment,
            operator: Operator::customer(user_id),
            created_at: Utc::now(),
        }
    }

    pub(crate) fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(10))
    }
}
