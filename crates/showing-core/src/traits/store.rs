// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The appointment repository boundary.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::appointment::{
    Appointment, AppointmentDetails, AppointmentLog, NewAppointment, Page, StatusChange,
    TimeWindow,
};
use crate::deadline::Deadline;
use crate::error::ShowingError;
use crate::queue::QueuePolicy;

/// Durable storage of appointments and their audit logs.
///
/// Every write takes a [`Deadline`]; implementations must not commit after
/// it has passed. Writes that combine a check with a mutation (creation,
/// transitions, queue renumbering) must be atomic with respect to other
/// writers touching the same store/date, agent/date or customer/date scope.
#[async_trait]
pub trait AppointmentStore: Send + Sync + 'static {
    /// Persist a new appointment.
    ///
    /// Inside one atomic unit the implementation re-checks the customer for
    /// conflicts, resolves the [`Assignment`](crate::Assignment), allocates a
    /// queue position with `policy` when no agent is bound, inserts the row
    /// and appends the creation log entry.
    async fn create_appointment(
        &self,
        new: NewAppointment,
        policy: QueuePolicy,
        deadline: Deadline,
    ) -> Result<Appointment, ShowingError>;

    async fn get_appointment_by_id(&self, id: i64) -> Result<Option<Appointment>, ShowingError>;

    async fn get_appointment_by_code(
        &self,
        code: &str,
    ) -> Result<Option<Appointment>, ShowingError>;

    /// Overwrite the customer-editable details of a non-terminal appointment.
    /// `at` becomes the new `updated_at`.
    async fn update_appointment(
        &self,
        id: i64,
        details: AppointmentDetails,
        at: DateTime<Utc>,
        deadline: Deadline,
    ) -> Result<Appointment, ShowingError>;

    /// Administrative removal. Renumbers the queue if the row held a position.
    async fn delete_appointment(
        &self,
        id: i64,
        policy: QueuePolicy,
        deadline: Deadline,
    ) -> Result<(), ShowingError>;

    /// Apply a status transition as a compare-and-set on the current status.
    ///
    /// Appends the log entry and, when the appointment leaves the queue,
    /// renumbers the remaining queue in the same atomic unit.
    async fn transition_appointment(
        &self,
        change: StatusChange,
        policy: QueuePolicy,
        deadline: Deadline,
    ) -> Result<Appointment, ShowingError>;

    /// A customer's appointments, newest first. `page` starts at 1.
    async fn get_appointments_by_user(
        &self,
        user_id: i64,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Appointment>, ShowingError>;

    async fn get_appointments_by_realtor(
        &self,
        realtor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, ShowingError>;

    async fn get_appointments_by_store(
        &self,
        store_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, ShowingError>;

    /// Whether the agent holds an active booking overlapping `window`.
    async fn check_realtor_time_conflict(
        &self,
        realtor_id: i64,
        window: TimeWindow,
        exclude: Option<i64>,
    ) -> Result<bool, ShowingError>;

    /// Whether the customer holds an active booking overlapping `window`.
    async fn check_user_time_conflict(
        &self,
        user_id: i64,
        window: TimeWindow,
        exclude: Option<i64>,
    ) -> Result<bool, ShowingError>;

    /// Number of queued appointments starting exactly at `start_time`.
    async fn get_queue_count(
        &self,
        store_id: i64,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> Result<u32, ShowingError>;

    /// Queued appointments for the scope, in queue order.
    async fn get_queued_appointments(
        &self,
        store_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, ShowingError>;

    /// Rewrite queue positions for the scope to `1..=N` in FIFO order.
    async fn update_queue_positions(
        &self,
        store_id: i64,
        date: NaiveDate,
        policy: QueuePolicy,
        deadline: Deadline,
    ) -> Result<(), ShowingError>;

    async fn get_appointment_logs(
        &self,
        appointment_id: i64,
    ) -> Result<Vec<AppointmentLog>, ShowingError>;

    /// Active appointments of a store over `days` dates from `start_date`.
    async fn get_store_bookings(
        &self,
        store_id: i64,
        start_date: NaiveDate,
        days: u32,
    ) -> Result<Vec<Appointment>, ShowingError>;
}
