// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row mapping between SQLite and the domain types in `showing-core`.
//!
//! Enums are stored as their snake_case names. Dates are `YYYY-MM-DD` and
//! times `HH:MM:SS`, so both compare correctly as text.

use std::str::FromStr;

use chrono::Weekday;
use rusqlite::Row;
use rusqlite::types::Type;
use showing_core::{Appointment, AppointmentLog, RealtorProfile, StoreProfile, WorkingHours};

/// Column list matching [`appointment_from_row`].
pub(crate) const APPOINTMENT_COLUMNS: &str = "id, appointment_code, user_id, store_id, \
     realtor_id, appointment_date, start_time, end_time, duration_minutes, queue_position, \
     estimated_wait_minutes, status, customer_name, customer_phone, requirements, \
     cancel_reason, confirmed_at, completed_at, cancelled_at, created_at, updated_at";

pub(crate) const LOG_COLUMNS: &str =
    "id, appointment_id, old_status, new_status, operator_type, operator_id, remark, created_at";

pub(crate) fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        appointment_code: row.get(1)?,
        user_id: row.get(2)?,
        store_id: row.get(3)?,
        realtor_id: row.get(4)?,
        appointment_date: row.get(5)?,
        start_time: row.get(6)?,
        end_time: row.get(7)?,
        duration_minutes: row.get(8)?,
        queue_position: row.get(9)?,
        estimated_wait_minutes: row.get(10)?,
        status: parse_text(row, 11)?,
        customer_name: row.get(12)?,
        customer_phone: row.get(13)?,
        requirements: row.get(14)?,
        cancel_reason: row.get(15)?,
        confirmed_at: row.get(16)?,
        completed_at: row.get(17)?,
        cancelled_at: row.get(18)?,
        created_at: row.get(19)?,
        updated_at: row.get(20)?,
    })
}

pub(crate) fn log_from_row(row: &Row<'_>) -> rusqlite::Result<AppointmentLog> {
    let old_status: Option<String> = row.get(2)?;
    Ok(AppointmentLog {
        id: row.get(0)?,
        appointment_id: row.get(1)?,
        old_status: old_status
            .map(|raw| parse_str(&raw, 2))
            .transpose()?,
        new_status: parse_text(row, 3)?,
        operator_type: parse_text(row, 4)?,
        operator_id: row.get(5)?,
        remark: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub(crate) fn store_from_row(row: &Row<'_>) -> rusqlite::Result<StoreProfile> {
    Ok(StoreProfile {
        id: row.get(0)?,
        name: row.get(1)?,
        active: row.get(2)?,
    })
}

pub(crate) fn realtor_from_row(row: &Row<'_>) -> rusqlite::Result<RealtorProfile> {
    Ok(RealtorProfile {
        id: row.get(0)?,
        store_id: row.get(1)?,
        name: row.get(2)?,
        active: row.get(3)?,
    })
}

/// Expects `weekday, open_time, close_time`.
pub(crate) fn hours_from_row(row: &Row<'_>) -> rusqlite::Result<WorkingHours> {
    let day: u8 = row.get(0)?;
    let weekday = Weekday::try_from(day)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(e)))?;
    Ok(WorkingHours {
        weekday,
        open: row.get(1)?,
        close: row.get(2)?,
    })
}

/// Storage encoding of a weekday: 0 = Monday.
pub(crate) fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_monday() as u8
}

fn parse_text<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    parse_str(&raw, idx)
}

fn parse_str<T>(raw: &str, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
