// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Overlap queries against active bookings.
//!
//! Two windows on the same date overlap when `s1 < e2 AND s2 < e1`; stored
//! times are fixed-width text, so the comparison happens in SQL.

use rusqlite::{Connection, params};
use showing_core::{ShowingError, TimeWindow};

use crate::database::{Database, map_tr_err};
use crate::queries::ACTIVE_STATUSES;

pub(crate) fn realtor_conflict(
    conn: &Connection,
    realtor_id: i64,
    window: &TimeWindow,
    exclude: Option<i64>,
) -> rusqlite::Result<bool> {
    overlap_exists(conn, "realtor_id", realtor_id, window, exclude)
}

pub(crate) fn user_conflict(
    conn: &Connection,
    user_id: i64,
    window: &TimeWindow,
    exclude: Option<i64>,
) -> rusqlite::Result<bool> {
    overlap_exists(conn, "user_id", user_id, window, exclude)
}

fn overlap_exists(
    conn: &Connection,
    owner_column: &'static str,
    owner_id: i64,
    window: &TimeWindow,
    exclude: Option<i64>,
) -> rusqlite::Result<bool> {
    let sql = format!(
        "SELECT EXISTS (
             SELECT 1 FROM appointments
             WHERE {owner_column} = ?1
               AND appointment_date = ?2
               AND start_time < ?4
               AND end_time > ?3
               AND status IN {ACTIVE_STATUSES}
               AND (?5 IS NULL OR id != ?5)
         )"
    );
    conn.query_row(
        &sql,
        params![owner_id, window.date, window.start, window.end, exclude],
        |row| row.get(0),
    )
}

/// Whether the agent holds an active booking overlapping `window`.
pub async fn check_realtor_time_conflict(
    db: &Database,
    realtor_id: i64,
    window: TimeWindow,
    exclude: Option<i64>,
) -> Result<bool, ShowingError> {
    db.connection()
        .call(move |conn| realtor_conflict(conn, realtor_id, &window, exclude))
        .await
        .map_err(map_tr_err)
}

/// Whether the customer holds an active booking overlapping `window`.
pub async fn check_user_time_conflict(
    db: &Database,
    user_id: i64,
    window: TimeWindow,
    exclude: Option<i64>,
) -> Result<bool, ShowingError> {
    db.connection()
        .call(move |conn| user_conflict(conn, user_id, &window, exclude))
        .await
        .map_err(map_tr_err)
}
