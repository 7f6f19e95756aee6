// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `showing seed`: load the store directory from a TOML file.
//!
//! ```toml
//! [[stores]]
//! id = 1
//! name = "Downtown"
//! hours = [{ open = "09:00", close = "18:00" }]
//!
//! [[realtors]]
//! id = 1
//! store_id = 1
//! name = "Ada"
//! hours = [{ days = ["sat", "sun"], open = "10:00", close = "16:00" }]
//! ```
//!
//! An hours entry without `days` applies to the whole week. Re-seeding
//! replaces each listed entity's hours.

use std::path::Path;

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use showing_core::{RealtorProfile, ShowingError, StoreProfile, WorkingHours};
use showing_scheduler::validation::parse_time;
use showing_storage::SqliteStorage;
use tracing::info;

use crate::commands::print_json;

const ALL_WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryFile {
    #[serde(default)]
    pub stores: Vec<StoreEntry>,
    #[serde(default)]
    pub realtors: Vec<RealtorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreEntry {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub hours: Vec<HoursEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RealtorEntry {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Empty means the agent follows the store's hours.
    #[serde(default)]
    pub hours: Vec<HoursEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HoursEntry {
    #[serde(default)]
    pub days: Vec<String>,
    pub open: String,
    pub close: String,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub stores: usize,
    pub realtors: usize,
    pub hours: usize,
}

impl DirectoryFile {
    pub fn parse(content: &str) -> Result<Self, ShowingError> {
        toml::from_str(content)
            .map_err(|e| ShowingError::Validation(format!("invalid directory file: {e}")))
    }
}

/// Expand hours entries into one interval per weekday.
pub fn expand_hours(entries: &[HoursEntry]) -> Result<Vec<WorkingHours>, ShowingError> {
    let mut hours = Vec::new();
    for entry in entries {
        let open = parse_time(&entry.open)?;
        let close = parse_time(&entry.close)?;
        if open >= close {
            return Err(ShowingError::Validation(format!(
                "working hours {} - {} must open before they close",
                entry.open, entry.close
            )));
        }
        let days = if entry.days.is_empty() {
            ALL_WEEK.to_vec()
        } else {
            entry
                .days
                .iter()
                .map(|day| {
                    day.parse::<Weekday>()
                        .map_err(|_| ShowingError::Validation(format!("unknown weekday `{day}`")))
                })
                .collect::<Result<Vec<_>, _>>()?
        };
        hours.extend(days.into_iter().map(|weekday| WorkingHours {
            weekday,
            open,
            close,
        }));
    }
    Ok(hours)
}

/// Write every entry of `file` into storage.
///
/// All hours are parsed before the first write so a malformed entry leaves
/// the directory untouched.
pub async fn apply(storage: &SqliteStorage, file: DirectoryFile) -> Result<SeedSummary, ShowingError> {
    let mut summary = SeedSummary::default();

    let stores = file
        .stores
        .into_iter()
        .map(|s| Ok((s.id, s.name, s.active, expand_hours(&s.hours)?)))
        .collect::<Result<Vec<_>, ShowingError>>()?;
    let realtors = file
        .realtors
        .into_iter()
        .map(|r| Ok((r.id, r.store_id, r.name, r.active, expand_hours(&r.hours)?)))
        .collect::<Result<Vec<_>, ShowingError>>()?;

    for (id, name, active, hours) in stores {
        storage.upsert_store(StoreProfile { id, name, active }).await?;
        summary.hours += hours.len();
        storage.replace_store_hours(id, hours).await?;
        summary.stores += 1;
    }
    for (id, store_id, name, active, hours) in realtors {
        storage
            .upsert_realtor(RealtorProfile {
                id,
                store_id,
                name,
                active,
            })
            .await?;
        summary.hours += hours.len();
        storage.replace_realtor_hours(id, hours).await?;
        summary.realtors += 1;
    }
    Ok(summary)
}

pub async fn run_seed(storage: &SqliteStorage, path: &Path) -> Result<(), ShowingError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ShowingError::Validation(format!("cannot read {}: {e}", path.display()))
    })?;
    let summary = apply(storage, DirectoryFile::parse(&content)?).await?;
    info!(
        stores = summary.stores,
        realtors = summary.realtors,
        hours = summary.hours,
        "directory seeded"
    );
    print_json(&summary)
}
