// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborators that fail loudly or never answer.

use std::sync::Mutex;
use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use showing_core::{
    Appointment, AppointmentDetails, AppointmentLog, AppointmentStore, Deadline, NewAppointment,
    Page, QueuePolicy, RealtorProfile, ShowingError, StatusChange, StoreDirectory, StoreProfile,
    TimeWindow, WorkingHours,
};
use showing_scheduler::CodeSource;

/// A store and directory that panic on every call.
///
/// Hand it to a manager to prove a code path rejects a request before
/// touching storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnreachableStore;

#[async_trait]
impl AppointmentStore for UnreachableStore {
    async fn create_appointment(
        &self,
        _new: NewAppointment,
        _policy: QueuePolicy,
        _deadline: Deadline,
    ) -> Result<Appointment, ShowingError> {
        unreachable!("create_appointment called")
    }

    async fn get_appointment_by_id(&self, _id: i64) -> Result<Option<Appointment>, ShowingError> {
        unreachable!("get_appointment_by_id called")
    }

    async fn get_appointment_by_code(
        &self,
        _code: &str,
    ) -> Result<Option<Appointment>, ShowingError> {
        unreachable!("get_appointment_by_code called")
    }

    async fn update_appointment(
        &self,
        _id: i64,
        _details: AppointmentDetails,
        _at: DateTime<Utc>,
        _deadline: Deadline,
    ) -> Result<Appointment, ShowingError> {
        unreachable!("update_appointment called")
    }

    async fn delete_appointment(
        &self,
        _id: i64,
        _policy: QueuePolicy,
        _deadline: Deadline,
    ) -> Result<(), ShowingError> {
        unreachable!("delete_appointment called")
    }

    async fn transition_appointment(
        &self,
        _change: StatusChange,
        _policy: QueuePolicy,
        _deadline: Deadline,
    ) -> Result<Appointment, ShowingError> {
        unreachable!("transition_appointment called")
    }

    async fn get_appointments_by_user(
        &self,
        _user_id: i64,
        _page: u32,
        _page_size: u32,
    ) -> Result<Page<Appointment>, ShowingError> {
        unreachable!("get_appointments_by_user called")
    }

    async fn get_appointments_by_realtor(
        &self,
        _realtor_id: i64,
        _date: NaiveDate,
    ) -> Result<Vec<Appointment>, ShowingError> {
        unreachable!("get_appointments_by_realtor called")
    }

    async fn get_appointments_by_store(
        &self,
        _store_id: i64,
        _date: NaiveDate,
    ) -> Result<Vec<Appointment>, ShowingError> {
        unreachable!("get_appointments_by_store called")
    }

    async fn check_realtor_time_conflict(
        &self,
        _realtor_id: i64,
        _window: TimeWindow,
        _exclude: Option<i64>,
    ) -> Result<bool, ShowingError> {
        unreachable!("check_realtor_time_conflict called")
    }

    async fn check_user_time_conflict(
        &self,
        _user_id: i64,
        _window: TimeWindow,
        _exclude: Option<i64>,
    ) -> Result<bool, ShowingError> {
        unreachable!("check_user_time_conflict called")
    }

    async fn get_queue_count(
        &self,
        _store_id: i64,
        _date: NaiveDate,
        _start_time: NaiveTime,
    ) -> Result<u32, ShowingError> {
        unreachable!("get_queue_count called")
    }

    async fn get_queued_appointments(
        &self,
        _store_id: i64,
        _date: NaiveDate,
    ) -> Result<Vec<Appointment>, ShowingError> {
        unreachable!("get_queued_appointments called")
    }

    async fn update_queue_positions(
        &self,
        _store_id: i64,
        _date: NaiveDate,
        _policy: QueuePolicy,
        _deadline: Deadline,
    ) -> Result<(), ShowingError> {
        unreachable!("update_queue_positions called")
    }

    async fn get_appointment_logs(
        &self,
        _appointment_id: i64,
    ) -> Result<Vec<AppointmentLog>, ShowingError> {
        unreachable!("get_appointment_logs called")
    }

    async fn get_store_bookings(
        &self,
        _store_id: i64,
        _start_date: NaiveDate,
        _days: u32,
    ) -> Result<Vec<Appointment>, ShowingError> {
        unreachable!("get_store_bookings called")
    }
}

#[async_trait]
impl StoreDirectory for UnreachableStore {
    async fn get_store(&self, _store_id: i64) -> Result<Option<StoreProfile>, ShowingError> {
        unreachable!("get_store called")
    }

    async fn list_store_realtors(
        &self,
        _store_id: i64,
    ) -> Result<Vec<RealtorProfile>, ShowingError> {
        unreachable!("list_store_realtors called")
    }

    async fn store_working_hours(
        &self,
        _store_id: i64,
        _weekday: Weekday,
    ) -> Result<Vec<WorkingHours>, ShowingError> {
        unreachable!("store_working_hours called")
    }

    async fn realtor_working_hours(
        &self,
        _realtor_id: i64,
        _weekday: Weekday,
    ) -> Result<Vec<WorkingHours>, ShowingError> {
        unreachable!("realtor_working_hours called")
    }
}

/// A directory whose calls never complete.
#[derive(Debug, Default, Clone, Copy)]
pub struct StallingDirectory;

#[async_trait]
impl StoreDirectory for StallingDirectory {
    async fn get_store(&self, _store_id: i64) -> Result<Option<StoreProfile>, ShowingError> {
        std::future::pending().await
    }

    async fn list_store_realtors(
        &self,
        _store_id: i64,
    ) -> Result<Vec<RealtorProfile>, ShowingError> {
        std::future::pending().await
    }

    async fn store_working_hours(
        &self,
        _store_id: i64,
        _weekday: Weekday,
    ) -> Result<Vec<WorkingHours>, ShowingError> {
        std::future::pending().await
    }

    async fn realtor_working_hours(
        &self,
        _realtor_id: i64,
        _weekday: Weekday,
    ) -> Result<Vec<WorkingHours>, ShowingError> {
        std::future::pending().await
    }
}

/// Hands out pre-set codes in order, then repeats the last one.
#[derive(Debug)]
pub struct SequenceCodes {
    codes: Mutex<VecDeque<String>>,
}

impl SequenceCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: Mutex::new(codes.into_iter().map(Into::into).collect()),
        }
    }
}

impl CodeSource for SequenceCodes {
    fn next_code(&self) -> String {
        let mut codes = self.codes.lock().unwrap_or_else(|e| e.into_inner());
        if codes.len() > 1 {
            codes.pop_front().unwrap_or_default()
        } else {
            codes.front().cloned().unwrap_or_default()
        }
    }
}
