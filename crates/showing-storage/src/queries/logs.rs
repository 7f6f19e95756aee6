// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only appointment audit log.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use showing_core::{AppointmentLog, AppointmentStatus, Operator, ShowingError};

use crate::database::{Database, map_tr_err};
use crate::models::{LOG_COLUMNS, log_from_row};

/// One log entry to be written alongside a status change.
pub(crate) struct LogEntry<'a> {
    pub appointment_id: i64,
    pub old_status: Option<AppointmentStatus>,
    pub new_status: AppointmentStatus,
    pub operator: &'a Operator,
    pub remark: Option<String>,
    pub at: DateTime<Utc>,
}

pub(crate) fn append(conn: &Connection, entry: LogEntry<'_>) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO appointment_logs
             (appointment_id, old_status, new_status, operator_type, operator_id, remark, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            entry.appointment_id,
            entry.old_status.map(|s| s.to_string()),
            entry.new_status.to_string(),
            entry.operator.kind.to_string(),
            entry.operator.id,
            entry.remark,
            entry.at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Every log entry for an appointment, oldest first.
pub async fn get_appointment_logs(
    db: &Database,
    appointment_id: i64,
) -> Result<Vec<AppointmentLog>, ShowingError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LOG_COLUMNS} FROM appointment_logs
                 WHERE appointment_id = ?1
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![appointment_id], log_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
