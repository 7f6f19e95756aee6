// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end scheduling tests.
//!
//! `TestHarness` opens a temp SQLite database, seeds one store with agents
//! and working hours, and builds an [`AppointmentManager`] over it with a
//! [`FixedClock`].

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use showing_config::model::{ShowingConfig, StorageConfig};
use showing_core::{RealtorProfile, ShowingError, StoreProfile, WorkingHours};
use showing_scheduler::{AppointmentManager, BookingRequest, CodeSource};
use showing_storage::SqliteStorage;

use crate::clock::FixedClock;

/// Id of the seeded store.
pub const STORE_ID: i64 = 1;

const ALL_WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    realtors: Vec<RealtorProfile>,
    realtor_hours: Vec<(i64, NaiveTime, NaiveTime)>,
    store_hours: (NaiveTime, NaiveTime),
    store_active: bool,
    now: NaiveDateTime,
    config: ShowingConfig,
    codes: Option<Arc<dyn CodeSource>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            realtors: Vec::new(),
            realtor_hours: Vec::new(),
            store_hours: (hm(9, 0), hm(18, 0)),
            store_active: true,
            now: TestHarness::today().and_time(hm(8, 0)),
            config: ShowingConfig::default(),
            codes: None,
        }
    }

    /// Seed active agents with ids `1..=count`.
    pub fn with_realtors(mut self, count: i64) -> Self {
        self.realtors.extend((1..=count).map(|id| RealtorProfile {
            id,
            store_id: STORE_ID,
            name: format!("Agent {id}"),
            active: true,
        }));
        self
    }

    /// Seed an agent that is assigned to the store but inactive.
    pub fn with_inactive_realtor(mut self, id: i64) -> Self {
        self.realtors.push(RealtorProfile {
            id,
            store_id: STORE_ID,
            name: format!("Agent {id}"),
            active: false,
        });
        self
    }

    /// Store opening hours, applied to every weekday.
    pub fn with_store_hours(mut self, open: NaiveTime, close: NaiveTime) -> Self {
        self.store_hours = (open, close);
        self
    }

    /// Personal hours for one agent, applied to every weekday.
    pub fn with_realtor_hours(mut self, realtor_id: i64, open: NaiveTime, close: NaiveTime) -> Self {
        self.realtor_hours.push((realtor_id, open, close));
        self
    }

    pub fn with_inactive_store(mut self) -> Self {
        self.store_active = false;
        self
    }

    /// Store-local "now" seen by the manager.
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    pub fn with_config(mut self, config: ShowingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_code_source(mut self, codes: Arc<dyn CodeSource>) -> Self {
        self.codes = Some(codes);
        self
    }

    /// Build the test harness, creating and seeding the database.
    pub async fn build(self) -> Result<TestHarness, ShowingError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| ShowingError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            ..config.storage
        };
        let storage = Arc::new(SqliteStorage::open(config.storage.clone()).await?);

        storage
            .upsert_store(StoreProfile {
                id: STORE_ID,
                name: "Test Store".to_string(),
                active: self.store_active,
            })
            .await?;
        let (open, close) = self.store_hours;
        storage
            .replace_store_hours(STORE_ID, every_day(open, close))
            .await?;
        for realtor in self.realtors {
            storage.upsert_realtor(realtor).await?;
        }
        for (realtor_id, open, close) in self.realtor_hours {
            storage
                .replace_realtor_hours(realtor_id, every_day(open, close))
                .await?;
        }

        let clock = Arc::new(FixedClock::at(self.now));
        let mut manager =
            AppointmentManager::new(storage.clone(), storage.clone(), clock.clone(), &config);
        if let Some(codes) = self.codes {
            manager = manager.with_code_source(codes);
        }

        Ok(TestHarness {
            manager,
            storage,
            clock,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A seeded store, its SQLite database and a manager over both.
pub struct TestHarness {
    pub manager: AppointmentManager,
    /// SQLite storage (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    pub clock: Arc<FixedClock>,
    pub config: ShowingConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The harness's default "today", a Monday.
    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 2).unwrap_or_default()
    }

    /// A valid booking request at the seeded store for today.
    pub fn booking(user_id: i64, start_time: &str, duration_minutes: u32) -> BookingRequest {
        BookingRequest {
            user_id,
            store_id: STORE_ID,
            realtor_id: None,
            appointment_date: Self::today().format("%Y-%m-%d").to_string(),
            start_time: start_time.to_string(),
            duration_minutes,
            customer_name: format!("Customer {user_id}"),
            customer_phone: "555-0100".to_string(),
            requirements: None,
        }
    }
}

fn every_day(open: NaiveTime, close: NaiveTime) -> Vec<WorkingHours> {
    ALL_WEEK
        .iter()
        .map(|&weekday| WorkingHours {
            weekday,
            open,
            close,
        })
        .collect()
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}
