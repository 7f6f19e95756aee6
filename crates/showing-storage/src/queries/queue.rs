// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-store, per-date queue of appointments waiting for an agent.
//!
//! An appointment is queued while it is `pending`, has no agent and holds a
//! positive `queue_position`. Positions are kept contiguous from 1 in FIFO
//! order by renumbering whenever an entry leaves.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{Connection, params};
use showing_core::{Appointment, Deadline, QueueEntry, QueuePolicy, ShowingError};
use tracing::debug;

use crate::database::{Database, map_tr_err};
use crate::models::{APPOINTMENT_COLUMNS, appointment_from_row};
use crate::writer;

const QUEUED: &str = "status = 'pending' AND realtor_id IS NULL AND queue_position > 0";

/// Number of appointments currently queued for the scope.
pub(crate) fn queue_len(conn: &Connection, store_id: i64, date: NaiveDate) -> rusqlite::Result<u32> {
    conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM appointments
             WHERE store_id = ?1 AND appointment_date = ?2 AND {QUEUED}"
        ),
        params![store_id, date],
        |row| row.get(0),
    )
}

/// Rewrite positions and wait estimates for the scope. Returns rows changed.
pub(crate) fn renumber(
    conn: &Connection,
    store_id: i64,
    date: NaiveDate,
    policy: &QueuePolicy,
) -> rusqlite::Result<usize> {
    let entries = {
        let mut stmt = conn.prepare(&format!(
            "SELECT id, created_at FROM appointments
             WHERE store_id = ?1 AND appointment_date = ?2 AND {QUEUED}"
        ))?;
        let rows = stmt.query_map(params![store_id, date], |row| {
            Ok(QueueEntry {
                appointment_id: row.get(0)?,
                created_at: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>()?
    };

    let mut changed = 0;
    for slot in policy.assign_positions(entries) {
        changed += conn.execute(
            "UPDATE appointments
             SET queue_position = ?1, estimated_wait_minutes = ?2
             WHERE id = ?3 AND (queue_position != ?1 OR estimated_wait_minutes != ?2)",
            params![slot.position, slot.estimated_wait_minutes, slot.appointment_id],
        )?;
    }
    debug!(store_id, %date, changed, "queue renumbered");
    Ok(changed)
}

/// Queued appointments whose window starts exactly at `start_time`.
pub async fn get_queue_count(
    db: &Database,
    store_id: i64,
    date: NaiveDate,
    start_time: NaiveTime,
) -> Result<u32, ShowingError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT COUNT(*) FROM appointments
                     WHERE store_id = ?1 AND appointment_date = ?2 AND start_time = ?3 AND {QUEUED}"
                ),
                params![store_id, date, start_time],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Queued appointments for the scope, in position order.
pub async fn get_queued_appointments(
    db: &Database,
    store_id: i64,
    date: NaiveDate,
) -> Result<Vec<Appointment>, ShowingError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments
                 WHERE store_id = ?1 AND appointment_date = ?2 AND {QUEUED}
                 ORDER BY queue_position ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![store_id, date], appointment_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Renumber the scope's queue as a standalone write.
pub async fn update_queue_positions(
    db: &Database,
    store_id: i64,
    date: NaiveDate,
    policy: QueuePolicy,
    deadline: Deadline,
) -> Result<(), ShowingError> {
    writer::write(db, deadline, move |conn| {
        renumber(conn, store_id, date, &policy)?;
        Ok(Ok(()))
    })
    .await
}
