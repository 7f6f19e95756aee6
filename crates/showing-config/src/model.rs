// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Showing appointment engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use showing_core::QueuePolicy;

/// Top-level Showing configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShowingConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Scheduling and queueing policy.
    #[serde(default)]
    pub scheduling: SchedulingConfig,

    /// Limits applied to booking request fields.
    #[serde(default)]
    pub booking: BookingConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in log output.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "showing".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// How long SQLite waits on a lock held by another process.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("showing").join("showing.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("showing.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// Scheduling and queueing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulingConfig {
    /// Appointment lengths a customer may request, in minutes.
    #[serde(default = "default_allowed_durations")]
    pub allowed_durations: Vec<u32>,

    /// Width of the slots reported by availability queries.
    #[serde(default = "default_slot_granularity_minutes")]
    pub slot_granularity_minutes: u32,

    /// Average service time used for queue wait estimates.
    #[serde(default = "default_average_service_minutes")]
    pub average_service_minutes: u32,

    /// How many days ahead a customer may book.
    #[serde(default = "default_max_advance_days")]
    pub max_advance_days: u32,

    /// Upper bound on the `days` argument of slot queries.
    #[serde(default = "default_max_slot_days")]
    pub max_slot_days: u32,

    /// Deadline for each store call.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            allowed_durations: default_allowed_durations(),
            slot_granularity_minutes: default_slot_granularity_minutes(),
            average_service_minutes: default_average_service_minutes(),
            max_advance_days: default_max_advance_days(),
            max_slot_days: default_max_slot_days(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl SchedulingConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn queue_policy(&self) -> QueuePolicy {
        QueuePolicy::new(self.average_service_minutes)
    }
}

fn default_allowed_durations() -> Vec<u32> {
    vec![30, 60, 90]
}

fn default_slot_granularity_minutes() -> u32 {
    60
}

fn default_average_service_minutes() -> u32 {
    30
}

fn default_max_advance_days() -> u32 {
    30
}

fn default_max_slot_days() -> u32 {
    14
}

fn default_store_timeout_ms() -> u64 {
    5000
}

/// Field length limits for booking requests, counted in characters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BookingConfig {
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,

    #[serde(default = "default_min_phone_len")]
    pub min_phone_len: usize,

    #[serde(default = "default_max_phone_len")]
    pub max_phone_len: usize,

    #[serde(default = "default_max_requirements_len")]
    pub max_requirements_len: usize,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            max_name_len: default_max_name_len(),
            min_phone_len: default_min_phone_len(),
            max_phone_len: default_max_phone_len(),
            max_requirements_len: default_max_requirements_len(),
        }
    }
}

fn default_max_name_len() -> usize {
    50
}

fn default_min_phone_len() -> usize {
    6
}

fn default_max_phone_len() -> usize {
    20
}

fn default_max_requirements_len() -> usize {
    500
}
