// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store, agent and working-hours records.
//!
//! The scheduling core only reads these. The upserts exist for seeding a
//! deployment from a directory file and for tests.

use chrono::Weekday;
use rusqlite::{OptionalExtension, params};
use showing_core::{RealtorProfile, ShowingError, StoreProfile, WorkingHours};

use crate::database::{Database, map_tr_err};
use crate::models::{
    hours_from_row, realtor_from_row, store_from_row, weekday_index,
};

pub async fn get_store(db: &Database, store_id: i64) -> Result<Option<StoreProfile>, ShowingError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, name, active FROM stores WHERE id = ?1",
                params![store_id],
                store_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_store_realtors(
    db: &Database,
    store_id: i64,
) -> Result<Vec<RealtorProfile>, ShowingError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, store_id, name, active FROM realtors
                 WHERE store_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![store_id], realtor_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn store_working_hours(
    db: &Database,
    store_id: i64,
    weekday: Weekday,
) -> Result<Vec<WorkingHours>, ShowingError> {
    hours_for(db, "store_working_hours", "store_id", store_id, weekday).await
}

pub async fn realtor_working_hours(
    db: &Database,
    realtor_id: i64,
    weekday: Weekday,
) -> Result<Vec<WorkingHours>, ShowingError> {
    hours_for(db, "realtor_working_hours", "realtor_id", realtor_id, weekday).await
}

async fn hours_for(
    db: &Database,
    table: &'static str,
    owner_column: &'static str,
    owner_id: i64,
    weekday: Weekday,
) -> Result<Vec<WorkingHours>, ShowingError> {
    let day = weekday_index(weekday);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT weekday, open_time, close_time FROM {table}
                 WHERE {owner_column} = ?1 AND weekday = ?2 AND active = 1
                 ORDER BY open_time ASC"
            ))?;
            let rows = stmt.query_map(params![owner_id, day], hours_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace a store record.
pub async fn upsert_store(db: &Database, store: StoreProfile) -> Result<(), ShowingError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO stores (id, name, active) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name, active = excluded.active",
                params![store.id, store.name, store.active],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace an agent record. The store must already exist.
pub async fn upsert_realtor(db: &Database, realtor: RealtorProfile) -> Result<(), ShowingError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO realtors (id, store_id, name, active) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                     store_id = excluded.store_id, name = excluded.name, active = excluded.active",
                params![realtor.id, realtor.store_id, realtor.name, realtor.active],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Replace every working-hours interval of a store.
pub async fn replace_store_hours(
    db: &Database,
    store_id: i64,
    hours: Vec<WorkingHours>,
) -> Result<(), ShowingError> {
    replace_hours(db, "store_working_hours", "store_id", store_id, hours).await
}

/// Replace every working-hours interval of an agent.
pub async fn replace_realtor_hours(
    db: &Database,
    realtor_id: i64,
    hours: Vec<WorkingHours>,
) -> Result<(), ShowingError> {
    replace_hours(db, "realtor_working_hours", "realtor_id", realtor_id, hours).await
}

async fn replace_hours(
    db: &Database,
    table: &'static str,
    owner_column: &'static str,
    owner_id: i64,
    hours: Vec<WorkingHours>,
) -> Result<(), ShowingError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                &format!("DELETE FROM {table} WHERE {owner_column} = ?1"),
                params![owner_id],
            )?;
            for interval in &hours {
                tx.execute(
                    &format!(
                        "INSERT INTO {table} ({owner_column}, weekday, open_time, close_time)
                         VALUES (?1, ?2, ?3, ?4)"
                    ),
                    params![
                        owner_id,
                        weekday_index(interval.weekday),
                        interval.open,
                        interval.close
                    ],
                )?;
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}
