// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `showing migrate` and `showing status`.

use serde::Serialize;
use showing_config::ShowingConfig;
use showing_core::{HealthStatus, ShowingError, StorageAdapter};
use showing_storage::SqliteStorage;

use crate::commands::print_json;

/// Structured output of `showing status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub service: String,
    pub backend: String,
    pub database_path: String,
    pub healthy: bool,
    pub status: String,
    pub allowed_durations: Vec<u32>,
    pub slot_granularity_minutes: u32,
    pub store_timeout_ms: u64,
}

impl StatusResponse {
    fn new(config: &ShowingConfig, backend: &str, health: &HealthStatus) -> Self {
        let (healthy, status) = match health {
            HealthStatus::Healthy => (true, "healthy".to_string()),
            HealthStatus::Degraded(reason) => (true, format!("degraded: {reason}")),
            HealthStatus::Unhealthy(reason) => (false, format!("unhealthy: {reason}")),
        };
        Self {
            service: config.service.name.clone(),
            backend: backend.to_string(),
            database_path: config.storage.database_path.clone(),
            healthy,
            status,
            allowed_durations: config.scheduling.allowed_durations.clone(),
            slot_granularity_minutes: config.scheduling.slot_granularity_minutes,
            store_timeout_ms: config.scheduling.store_timeout_ms,
        }
    }
}

/// Migrations already ran when storage was opened; report where.
pub fn run_migrate(config: &ShowingConfig) -> Result<(), ShowingError> {
    #[derive(Serialize)]
    struct Migrated<'a> {
        database_path: &'a str,
        schema: &'static str,
    }
    print_json(&Migrated {
        database_path: &config.storage.database_path,
        schema: "up to date",
    })
}

pub async fn run_status(config: &ShowingConfig, storage: &SqliteStorage) -> Result<(), ShowingError> {
    let health = storage.health_check().await?;
    print_json(&StatusResponse::new(config, storage.name(), &health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_response_serializes() {
        let resp = StatusResponse::new(&ShowingConfig::default(), "sqlite", &HealthStatus::Healthy);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"healthy\":true"));
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"backend\":\"sqlite\""));
    }

    #[test]
    fn unhealthy_storage_is_reported() {
        let resp = StatusResponse::new(
            &ShowingConfig::default(),
            "sqlite",
            &HealthStatus::Unhealthy("disk I/O error".into()),
        );
        assert!(!resp.healthy);
        assert_eq!(resp.status, "unhealthy: disk I/O error");
    }
}
