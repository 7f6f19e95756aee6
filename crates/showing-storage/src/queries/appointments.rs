// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment creation, lookup, editing and listing.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use showing_core::{
    Appointment, AppointmentDetails, AppointmentStatus, Assignment, ConflictSubject, Deadline,
    NewAppointment, Page, QueuePolicy, ShowingError,
};
use tracing::debug;

use crate::database::{Database, map_tr_err};
use crate::models::{APPOINTMENT_COLUMNS, appointment_from_row};
use crate::queries::logs::{self, LogEntry};
use crate::queries::{ACTIVE_STATUSES, conflicts, queue};
use crate::writer;

pub(crate) fn fetch(conn: &Connection, id: i64) -> rusqlite::Result<Option<Appointment>> {
    conn.query_row(
        &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
        params![id],
        appointment_from_row,
    )
    .optional()
}

fn code_taken(conn: &Connection, code: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM appointments WHERE appointment_code = ?1)",
        params![code],
        |row| row.get(0),
    )
}

/// Insert a new appointment after re-checking conflicts inside the transaction.
///
/// Resolves the requested [`Assignment`]: a preferred agent must be free,
/// otherwise the first free candidate is bound. With no free candidate the
/// appointment joins the `(store, date)` queue at the tail.
pub async fn create_appointment(
    db: &Database,
    new: NewAppointment,
    policy: QueuePolicy,
    deadline: Deadline,
) -> Result<Appointment, ShowingError> {
    writer::write(db, deadline, move |conn| {
        if code_taken(conn, &new.appointment_code)? {
            return Ok(Err(ShowingError::conflict(
                ConflictSubject::AppointmentCode,
                format!("code {} is already issued", new.appointment_code),
            )));
        }

        let window = new.window;
        if conflicts::user_conflict(conn, new.user_id, &window, None)? {
            return Ok(Err(ShowingError::conflict(
                ConflictSubject::Customer,
                format!(
                    "customer {} already has an appointment overlapping {} {}-{}",
                    new.user_id, window.date, window.start, window.end
                ),
            )));
        }

        let realtor_id = match &new.assignment {
            Assignment::Preferred(id) => {
                if conflicts::realtor_conflict(conn, *id, &window, None)? {
                    return Ok(Err(ShowingError::conflict(
                        ConflictSubject::Realtor,
                        format!("realtor {id} is booked during the requested window"),
                    )));
                }
                Some(*id)
            }
            Assignment::FirstAvailable(candidates) => {
                let mut chosen = None;
                for &candidate in candidates {
                    if !conflicts::realtor_conflict(conn, candidate, &window, None)? {
                        chosen = Some(candidate);
                        break;
                    }
                }
                chosen
            }
        };

        let (queue_position, estimated_wait_minutes) = match realtor_id {
            Some(_) => (0, 0),
            None => {
                let position = policy.next_position(queue::queue_len(conn, new.store_id, window.date)?);
                (position, policy.estimate_wait_minutes(position))
            }
        };

        conn.execute(
            "INSERT INTO appointments (
                 appointment_code, user_id, store_id, realtor_id, appointment_date,
                 start_time, end_time, duration_minutes, queue_position, estimated_wait_minutes,
                 status, customer_name, customer_phone, requirements, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15)",
            params![
                new.appointment_code,
                new.user_id,
                new.store_id,
                realtor_id,
                window.date,
                window.start,
                window.end,
                window.duration_minutes(),
                queue_position,
                estimated_wait_minutes,
                AppointmentStatus::Pending.to_string(),
                new.customer_name,
                new.customer_phone,
                new.requirements,
                new.created_at,
            ],
        )?;
        let id = conn.last_insert_rowid();

        let remark = match realtor_id {
            Some(realtor) => format!("booked with realtor {realtor}"),
            None => format!("queued at position {queue_position}"),
        };
        logs::append(
            conn,
            LogEntry {
                appointment_id: id,
                old_status: None,
                new_status: AppointmentStatus::Pending,
                operator: &new.operator,
                remark: Some(remark),
                at: new.created_at,
            },
        )?;

        debug!(id, code = %new.appointment_code, ?realtor_id, queue_position, "appointment inserted");
        match fetch(conn, id)? {
            Some(appointment) => Ok(Ok(appointment)),
            None => Ok(Err(ShowingError::Internal(format!(
                "appointment {id} vanished after insert"
            )))),
        }
    })
    .await
}

pub async fn get_appointment_by_id(
    db: &Database,
    id: i64,
) -> Result<Option<Appointment>, ShowingError> {
    db.connection()
        .call(move |conn| fetch(conn, id))
        .await
        .map_err(map_tr_err)
}

pub async fn get_appointment_by_code(
    db: &Database,
    code: &str,
) -> Result<Option<Appointment>, ShowingError> {
    let code = code.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE appointment_code = ?1"),
                params![code],
                appointment_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the customer-editable details of a non-terminal appointment,
/// stamping `updated_at` with `at`.
pub async fn update_appointment(
    db: &Database,
    id: i64,
    details: AppointmentDetails,
    at: DateTime<Utc>,
    deadline: Deadline,
) -> Result<Appointment, ShowingError> {
    writer::write(db, deadline, move |conn| {
        let Some(current) = fetch(conn, id)? else {
            return Ok(Err(ShowingError::appointment_not_found(id)));
        };
        if current.status.is_terminal() {
            return Ok(Err(ShowingError::InvalidTransition {
                current: current.status,
                attempted: "update".to_string(),
            }));
        }
        conn.execute(
            "UPDATE appointments
             SET customer_name = ?1, customer_phone = ?2, requirements = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                details.customer_name,
                details.customer_phone,
                details.requirements,
                at,
                id
            ],
        )?;
        Ok(Ok(Appointment {
            customer_name: details.customer_name,
            customer_phone: details.customer_phone,
            requirements: details.requirements,
            updated_at: at,
            ..current
        }))
    })
    .await
}

/// Remove an appointment and its logs, closing any gap it leaves in the queue.
pub async fn delete_appointment(
    db: &Database,
    id: i64,
    policy: QueuePolicy,
    deadline: Deadline,
) -> Result<(), ShowingError> {
    writer::write(db, deadline, move |conn| {
        let Some(current) = fetch(conn, id)? else {
            return Ok(Err(ShowingError::appointment_not_found(id)));
        };
        conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
        if current.is_queued() {
            queue::renumber(conn, current.store_id, current.appointment_date, &policy)?;
        }
        Ok(Ok(()))
    })
    .await
}

/// A customer's appointments, newest date first. Pages start at 1.
pub async fn get_appointments_by_user(
    db: &Database,
    user_id: i64,
    page: u32,
    page_size: u32,
) -> Result<Page<Appointment>, ShowingError> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let offset = i64::from(page - 1) * i64::from(page_size);
    db.connection()
        .call(move |conn| {
            let total: i64 = conn.query_row(
                "SELECT COUNT(*) FROM appointments WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments
                 WHERE user_id = ?1
                 ORDER BY appointment_date DESC, start_time DESC, id DESC
                 LIMIT ?2 OFFSET ?3"
            ))?;
            let items = stmt
                .query_map(params![user_id, page_size, offset], appointment_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Page {
                items,
                total: total.unsigned_abs(),
                page,
                page_size,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// An agent's appointments on a date in start-time order, any status.
pub async fn get_appointments_by_realtor(
    db: &Database,
    realtor_id: i64,
    date: NaiveDate,
) -> Result<Vec<Appointment>, ShowingError> {
    list_for_date(db, "realtor_id", realtor_id, date).await
}

/// A store's appointments on a date in start-time order, any status.
pub async fn get_appointments_by_store(
    db: &Database,
    store_id: i64,
    date: NaiveDate,
) -> Result<Vec<Appointment>, ShowingError> {
    list_for_date(db, "store_id", store_id, date).await
}

async fn list_for_date(
    db: &Database,
    owner_column: &'static str,
    owner_id: i64,
    date: NaiveDate,
) -> Result<Vec<Appointment>, ShowingError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments
                 WHERE {owner_column} = ?1 AND appointment_date = ?2
                 ORDER BY start_time ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![owner_id, date], appointment_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Active appointments of a store in `[start_date, start_date + days)`.
pub async fn get_store_bookings(
    db: &Database,
    store_id: i64,
    start_date: NaiveDate,
    days: u32,
) -> Result<Vec<Appointment>, ShowingError> {
    let end_date = start_date
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| ShowingError::Validation(format!("{days} days from {start_date} is out of range")))?;
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments
                 WHERE store_id = ?1
                   AND appointment_date >= ?2 AND appointment_date < ?3
                   AND status IN {ACTIVE_STATUSES}
                 ORDER BY appointment_date ASC, start_time ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![store_id, start_date, end_date], appointment_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
