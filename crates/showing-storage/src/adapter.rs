// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage, appointment and directory traits.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use tokio::sync::OnceCell;
use tracing::debug;

use showing_config::model::StorageConfig;
use showing_core::{
    Appointment, AppointmentDetails, AppointmentLog, AppointmentStore, Deadline, HealthStatus,
    NewAppointment, Page, QueuePolicy, RealtorProfile, ShowingError, StatusChange,
    StorageAdapter, StoreDirectory, StoreProfile, TimeWindow, WorkingHours,
};

use crate::database::{self, Database, DatabaseOptions};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened on the first call to
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`](StorageAdapter::initialize) is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open and initialize storage in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, ShowingError> {
        let storage = Self::new(config);
        storage.initialize().await?;
        Ok(storage)
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    pub fn db(&self) -> Result<&Database, ShowingError> {
        self.db.get().ok_or_else(|| ShowingError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// Insert a store or overwrite its name and active flag.
    pub async fn upsert_store(&self, store: StoreProfile) -> Result<(), ShowingError> {
        queries::directory::upsert_store(self.db()?, store).await
    }

    /// Insert an agent or overwrite its record. The store must already exist.
    pub async fn upsert_realtor(&self, realtor: RealtorProfile) -> Result<(), ShowingError> {
        queries::directory::upsert_realtor(self.db()?, realtor).await
    }

    /// Replace every working-hours interval of a store.
    pub async fn replace_store_hours(
        &self,
        store_id: i64,
        hours: Vec<WorkingHours>,
    ) -> Result<(), ShowingError> {
        queries::directory::replace_store_hours(self.db()?, store_id, hours).await
    }

    /// Replace every working-hours interval of an agent. An empty list
    /// makes the agent follow the store's hours.
    pub async fn replace_realtor_hours(
        &self,
        realtor_id: i64,
        hours: Vec<WorkingHours>,
    ) -> Result<(), ShowingError> {
        queries::directory::replace_realtor_hours(self.db()?, realtor_id, hours).await
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn initialize(&self) -> Result<(), ShowingError> {
        let path = self.config.database_path.clone();
        let db = Database::open_with(&path, DatabaseOptions::from(&self.config)).await?;
        self.db.set(db).map_err(|_| ShowingError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn health_check(&self) -> Result<HealthStatus, ShowingError> {
        let Some(db) = self.db.get() else {
            return Ok(HealthStatus::Unhealthy("storage not initialized".to_string()));
        };
        let ping = db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await;
        Ok(match ping {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn close(&self) -> Result<(), ShowingError> {
        database::checkpoint(self.db()?).await
    }
}

#[async_trait]
impl AppointmentStore for SqliteStorage {
    async fn create_appointment(
        &self,
        new: NewAppointment,
        policy: QueuePolicy,
        deadline: Deadline,
    ) -> Result<Appointment, ShowingError> {
        queries::appointments::create_appointment(self.db()?, new, policy, deadline).await
    }

    async fn get_appointment_by_id(&self, id: i64) -> Result<Option<Appointment>, ShowingError> {
        queries::appointments::get_appointment_by_id(self.db()?, id).await
    }

    async fn get_appointment_by_code(
        &self,
        code: &str,
    ) -> Result<Option<Appointment>, ShowingError> {
        queries::appointments::get_appointment_by_code(self.db()?, code).await
    }

    async fn update_appointment(
        &self,
        id: i64,
        details: AppointmentDetails,
        at: DateTime<Utc>,
        deadline: Deadline,
    ) -> Result<Appointment, ShowingError> {
        queries::appointments::update_appointment(self.db()?, id, details, at, deadline).await
    }

    async fn delete_appointment(
        &self,
        id: i64,
        policy: QueuePolicy,
        deadline: Deadline,
    ) -> Result<(), ShowingError> {
        queries::appointments::delete_appointment(self.db()?, id, policy, deadline).await
    }

    async fn transition_appointment(
        &self,
        change: StatusChange,
        policy: QueuePolicy,
        deadline: Deadline,
    ) -> Result<Appointment, ShowingError> {
        queries::transitions::transition_appointment(self.db()?, change, policy, deadline).await
    }

    async fn get_appointments_by_user(
        &self,
        user_id: i64,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Appointment>, ShowingError> {
        queries::appointments::get_appointments_by_user(self.db()?, user_id, page, page_size).await
    }

    async fn get_appointments_by_realtor(
        &self,
        realtor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, ShowingError> {
        queries::appointments::get_appointments_by_realtor(self.db()?, realtor_id, date).await
    }

    async fn get_appointments_by_store(
        &self,
        store_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, ShowingError> {
        queries::appointments::get_appointments_by_store(self.db()?, store_id, date).await
    }

    async fn check_realtor_time_conflict(
        &self,
        realtor_id: i64,
        window: TimeWindow,
        exclude: Option<i64>,
    ) -> Result<bool, ShowingError> {
        queries::conflicts::check_realtor_time_conflict(self.db()?, realtor_id, window, exclude)
            .await
    }

    async fn check_user_time_conflict(
        &self,
        user_id: i64,
        window: TimeWindow,
        exclude: Option<i64>,
    ) -> Result<bool, ShowingError> {
        queries::conflicts::check_user_time_conflict(self.db()?, user_id, window, exclude).await
    }

    async fn get_queue_count(
        &self,
        store_id: i64,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> Result<u32, ShowingError> {
        queries::queue::get_queue_count(self.db()?, store_id, date, start_time).await
    }

    async fn get_queued_appointments(
        &self,
        store_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, ShowingError> {
        queries::queue::get_queued_appointments(self.db()?, store_id, date).await
    }

    async fn update_queue_positions(
        &self,
        store_id: i64,
        date: NaiveDate,
        policy: QueuePolicy,
        deadline: Deadline,
    ) -> Result<(), ShowingError> {
        queries::queue::update_queue_positions(self.db()?, store_id, date, policy, deadline).await
    }

    async fn get_appointment_logs(
        &self,
        appointment_id: i64,
    ) -> Result<Vec<AppointmentLog>, ShowingError> {
        queries::logs::get_appointment_logs(self.db()?, appointment_id).await
    }

    async fn get_store_bookings(
        &self,
        store_id: i64,
        start_date: NaiveDate,
        days: u32,
    ) -> Result<Vec<Appointment>, ShowingError> {
        queries::appointments::get_store_bookings(self.db()?, store_id, start_date, days).await
    }
}

#[async_trait]
impl StoreDirectory for SqliteStorage {
    async fn get_store(&self, store_id: i64) -> Result<Option<StoreProfile>, ShowingError> {
        queries::directory::get_store(self.db()?, store_id).await
    }

    async fn list_store_realtors(
        &self,
        store_id: i64,
    ) -> Result<Vec<RealtorProfile>, ShowingError> {
        queries::directory::list_store_realtors(self.db()?, store_id).await
    }

    async fn store_working_hours(
        &self,
        store_id: i64,
        weekday: Weekday,
    ) -> Result<Vec<WorkingHours>, ShowingError> {
        queries::directory::store_working_hours(self.db()?, store_id, weekday).await
    }

    async fn realtor_working_hours(
        &self,
        realtor_id: i64,
        weekday: Weekday,
    ) -> Result<Vec<WorkingHours>, ShowingError> {
        queries::directory::realtor_working_hours(self.db()?, realtor_id, weekday).await
    }
}
