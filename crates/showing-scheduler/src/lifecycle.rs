// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The appointment lifecycle manager.
//!
//! Orchestrates validation, conflict checks, agent assignment and queueing
//! for new bookings, and drives the status state machine afterwards. All
//! collaborators are injected; the manager holds no mutable state.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime};
use showing_config::model::ShowingConfig;
use showing_core::{
    Appointment, AppointmentDetails, AppointmentLog, AppointmentStore, Assignment, Clock,
    ConflictSubject, NewAppointment, Operator, Page, QueuePolicy, RealtorProfile, ShowingError,
    StatusChange, StoreDirectory, TimeSlot, TimeWindow, Transition,
};
use tracing::{debug, info, warn};

use crate::code::{CodeSource, RandomCodes};
use crate::conflict::{ConflictChecker, Subject};
use crate::queue::QueueAllocator;
use crate::requests::{BookingRequest, ValidatedBooking};
use crate::slots::SlotCalculator;
use crate::timeout::StoreTimeout;
use crate::validation::RequestValidator;

/// Attempts at drawing an unused appointment code before giving up.
const MAX_CODE_ATTEMPTS: usize = 5;

/// Largest page a listing may request.
pub const MAX_PAGE_SIZE: u32 = 100;

pub struct AppointmentManager {
    store: Arc<dyn AppointmentStore>,
    directory: Arc<dyn StoreDirectory>,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn CodeSource>,
    validator: RequestValidator,
    conflicts: ConflictChecker,
    queue: QueueAllocator,
    slots: SlotCalculator,
    timeout: StoreTimeout,
}

impl AppointmentManager {
    /// Wire the manager to its store, directory and clock.
    ///
    /// Scheduling and booking settings are read once from `config`.
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        directory: Arc<dyn StoreDirectory>,
        clock: Arc<dyn Clock>,
        config: &ShowingConfig,
    ) -> Self {
        let scheduling = &config.scheduling;
        let timeout = StoreTimeout::new(scheduling.store_timeout());
        Self {
            conflicts: ConflictChecker::new(store.clone(), timeout),
            queue: QueueAllocator::new(store.clone(), scheduling.queue_policy(), timeout),
            slots: SlotCalculator::new(
                store.clone(),
                directory.clone(),
                scheduling.slot_granularity_minutes,
                scheduling.max_slot_days,
                timeout,
            ),
            validator: RequestValidator::new(scheduling, &config.booking),
            codes: Arc::new(RandomCodes),
            store,
            directory,
            clock,
            timeout,
        }
    }

    /// Replace the appointment code generator.
    pub fn with_code_source(mut self, codes: Arc<dyn CodeSource>) -> Self {
        self.codes = codes;
        self
    }

    /// The waiting-queue view the manager books against.
    pub fn queue(&self) -> &QueueAllocator {
        &self.queue
    }

    fn policy(&self) -> QueuePolicy {
        self.queue.policy()
    }

    /// Validate and persist a new booking.
    ///
    /// A preferred agent must be an active agent of the store whose hours
    /// cover the window and who is free during it. Without
    /// a preference the first free agent whose hours cover the window is
    /// bound; if none is free the appointment is queued.
    pub async fn create_appointment(
        &self,
        request: BookingRequest,
    ) -> Result<Appointment, ShowingError> {
        let booking = self
            .validator
            .validate_booking(&request, self.clock.local_now())
            .inspect_err(|e| debug!(error = %e, "booking request rejected"))?;
        let window = booking.window;

        let store = self
            .timeout
            .run("get_store", self.directory.get_store(booking.store_id))
            .await?
            .ok_or_else(|| {
                ShowingError::Validation(format!("store {} does not exist", booking.store_id))
            })?;
        if !store.active {
            return Err(ShowingError::Validation(format!(
                "store {} is not accepting appointments",
                store.id
            )));
        }

        let weekday = window.date.weekday();
        let store_hours = self
            .timeout
            .run(
                "store_working_hours",
                self.directory.store_working_hours(store.id, weekday),
            )
            .await?;
        if !store_hours.iter().any(|h| h.covers(window.start, window.end)) {
            return Err(ShowingError::Validation(format!(
                "{}-{} on {weekday} is outside the store's working hours",
                window.start, window.end
            )));
        }

        if self
            .conflicts
            .has_conflict(Subject::Customer(booking.user_id), window, None)
            .await?
        {
            return Err(ShowingError::conflict(
                ConflictSubject::Customer,
                format!(
                    "customer {} already has an appointment overlapping {} {}-{}",
                    booking.user_id, window.date, window.start, window.end
                ),
            ));
        }

        let realtors = self.active_realtors(store.id).await?;
        let assignment = self.resolve_assignment(&booking, &realtors).await?;
        self.persist(booking, assignment).await
    }

    async fn active_realtors(&self, store_id: i64) -> Result<Vec<RealtorProfile>, ShowingError> {
        let mut realtors = self
            .timeout
            .run("list_store_realtors", self.directory.list_store_realtors(store_id))
            .await?;
        realtors.retain(|r| r.active);
        realtors.sort_by_key(|r| r.id);
        Ok(realtors)
    }

    async fn resolve_assignment(
        &self,
        booking: &ValidatedBooking,
        realtors: &[RealtorProfile],
    ) -> Result<Assignment, ShowingError> {
        let window = booking.window;
        if let Some(preferred) = booking.preferred_realtor {
            if !realtors.iter().any(|r| r.id == preferred) {
                return Err(ShowingError::Validation(format!(
                    "realtor {preferred} is not an active agent of store {}",
                    booking.store_id
                )));
            }
            if !self.realtor_works(preferred, &window).await? {
                return Err(ShowingError::Validation(format!(
                    "{}-{} on {} is outside realtor {preferred}'s working hours",
                    window.start,
                    window.end,
                    window.date.weekday()
                )));
            }
            if self
                .conflicts
                .has_conflict(Subject::Realtor(preferred), window, None)
                .await?
            {
                return Err(ShowingError::conflict(
                    ConflictSubject::Realtor,
                    format!("realtor {preferred} is booked during the requested window"),
                ));
            }
            return Ok(Assignment::Preferred(preferred));
        }

        let mut candidates = Vec::with_capacity(realtors.len());
        for realtor in realtors {
            if self.realtor_works(realtor.id, &window).await? {
                candidates.push(realtor.id);
            }
        }
        Ok(Assignment::FirstAvailable(candidates))
    }

    /// An agent with no hours of their own for the weekday follows the store.
    async fn realtor_works(&self, realtor_id: i64, window: &TimeWindow) -> Result<bool, ShowingError> {
        let hours = self
            .timeout
            .run(
                "realtor_working_hours",
                self.directory
                    .realtor_working_hours(realtor_id, window.date.weekday()),
            )
            .await?;
        Ok(hours.is_empty() || hours.iter().any(|h| h.covers(window.start, window.end)))
    }

    async fn persist(
        &self,
        booking: ValidatedBooking,
        assignment: Assignment,
    ) -> Result<Appointment, ShowingError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let new = NewAppointment {
                appointment_code: self.codes.next_code(),
                user_id: booking.user_id,
                store_id: booking.store_id,
                window: booking.window,
                customer_name: booking.customer_name.clone(),
                customer_phone: booking.customer_phone.clone(),
                requirements: booking.requirements.clone(),
                assignment: assignment.clone(),
                operator: Operator::customer(booking.user_id),
                created_at: self.clock.now(),
            };
            let deadline = self.timeout.deadline();
            let result = self
                .timeout
                .run_write(
                    "create_appointment",
                    deadline,
                    self.store.create_appointment(new, self.policy(), deadline),
                )
                .await;
            match result {
                Ok(appointment) => {
                    info!(
                        appointment_id = appointment.id,
                        code = %appointment.appointment_code,
                        status = %appointment.status,
                        realtor_id = ?appointment.realtor_id,
                        queue_position = appointment.queue_position,
                        "appointment created"
                    );
                    return Ok(appointment);
                }
                Err(ShowingError::Conflict {
                    subject: ConflictSubject::AppointmentCode,
                    ..
                }) => {
                    debug!(attempt, "appointment code collision, drawing another");
                }
                Err(e) => {
                    if matches!(e, ShowingError::Conflict { .. }) {
                        warn!(error = %e, "booking lost a race for its window");
                    }
                    return Err(e);
                }
            }
        }
        Err(ShowingError::Internal(format!(
            "no unused appointment code after {MAX_CODE_ATTEMPTS} attempts"
        )))
    }

    /// An agent claims a pending appointment.
    ///
    /// The status is checked before the agent, so claiming a cancelled or
    /// finished appointment reports the invalid transition even when the
    /// agent is also busy. The store re-checks everything when it commits.
    pub async fn accept_appointment(
        &self,
        appointment_id: i64,
        realtor_id: i64,
    ) -> Result<Appointment, ShowingError> {
        let current = self.get_appointment(appointment_id).await?;
        if !Transition::Accept.permitted_from(current.status) {
            return Err(ShowingError::InvalidTransition {
                current: current.status,
                attempted: Transition::Accept.to_string(),
            });
        }
        let realtors = self.active_realtors(current.store_id).await?;
        if !realtors.iter().any(|r| r.id == realtor_id) {
            return Err(ShowingError::Validation(format!(
                "realtor {realtor_id} is not an active agent of store {}",
                current.store_id
            )));
        }
        if self
            .conflicts
            .has_conflict(Subject::Realtor(realtor_id), current.window(), Some(current.id))
            .await?
        {
            return Err(ShowingError::conflict(
                ConflictSubject::Realtor,
                format!("realtor {realtor_id} is booked during this appointment"),
            ));
        }
        self.transition(
            appointment_id,
            Transition::Accept,
            Some(realtor_id),
            None,
            Operator::realtor(realtor_id),
        )
        .await
    }

    /// The bound agent begins the service.
    pub async fn start_appointment(
        &self,
        appointment_id: i64,
        realtor_id: i64,
    ) -> Result<Appointment, ShowingError> {
        self.transition(
            appointment_id,
            Transition::Start,
            Some(realtor_id),
            None,
            Operator::realtor(realtor_id),
        )
        .await
    }

    /// The bound agent finishes the service.
    pub async fn complete_appointment(
        &self,
        appointment_id: i64,
        realtor_id: i64,
    ) -> Result<Appointment, ShowingError> {
        self.transition(
            appointment_id,
            Transition::Complete,
            Some(realtor_id),
            None,
            Operator::realtor(realtor_id),
        )
        .await
    }

    /// Cancel a pending or confirmed appointment on behalf of `operator`.
    ///
    /// A queued appointment leaves the queue and the entries behind it move
    /// up in the same write.
    pub async fn cancel_appointment(
        &self,
        appointment_id: i64,
        operator: Operator,
        reason: Option<String>,
    ) -> Result<Appointment, ShowingError> {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        self.transition(appointment_id, Transition::Cancel, None, reason, operator)
            .await
    }

    async fn transition(
        &self,
        appointment_id: i64,
        transition: Transition,
        realtor_id: Option<i64>,
        reason: Option<String>,
        operator: Operator,
    ) -> Result<Appointment, ShowingError> {
        let change = StatusChange {
            appointment_id,
            transition,
            realtor_id,
            reason,
            operator,
            at: self.clock.now(),
        };
        let deadline = self.timeout.deadline();
        let result = self
            .timeout
            .run_write(
                "transition_appointment",
                deadline,
                self.store
                    .transition_appointment(change, self.policy(), deadline),
            )
            .await;
        match result {
            Ok(appointment) => {
                info!(
                    appointment_id = appointment.id,
                    code = %appointment.appointment_code,
                    status = %appointment.status,
                    %transition,
                    "appointment transitioned"
                );
                Ok(appointment)
            }
            Err(e) => {
                warn!(appointment_id, %transition, error = %e, "transition rejected");
                Err(e)
            }
        }
    }

    /// Edit customer details of a non-terminal appointment.
    pub async fn update_appointment(
        &self,
        appointment_id: i64,
        details: AppointmentDetails,
    ) -> Result<Appointment, ShowingError> {
        let details = self.validator.validate_details(&details)?;
        let deadline = self.timeout.deadline();
        self.timeout
            .run_write(
                "update_appointment",
                deadline,
                self.store
                    .update_appointment(appointment_id, details, self.clock.now(), deadline),
            )
            .await
    }

    /// Administrative removal.
    pub async fn delete_appointment(&self, appointment_id: i64) -> Result<(), ShowingError> {
        let deadline = self.timeout.deadline();
        self.timeout
            .run_write(
                "delete_appointment",
                deadline,
                self.store
                    .delete_appointment(appointment_id, self.policy(), deadline),
            )
            .await?;
        info!(appointment_id, "appointment deleted");
        Ok(())
    }

    /// Look up an appointment by id; `NotFound` if it does not exist.
    pub async fn get_appointment(&self, appointment_id: i64) -> Result<Appointment, ShowingError> {
        self.timeout
            .run(
                "get_appointment_by_id",
                self.store.get_appointment_by_id(appointment_id),
            )
            .await?
            .ok_or_else(|| ShowingError::appointment_not_found(appointment_id))
    }

    /// Look up an appointment by its customer-facing code. Case and
    /// surrounding whitespace are ignored.
    pub async fn get_appointment_by_code(&self, code: &str) -> Result<Appointment, ShowingError> {
        let code = code.trim().to_ascii_uppercase();
        self.timeout
            .run("get_appointment_by_code", self.store.get_appointment_by_code(&code))
            .await?
            .ok_or_else(|| ShowingError::appointment_not_found(&code))
    }

    /// A customer's appointments, latest date first, one page at a time.
    ///
    /// `page` starts at 1 and `page_size` is capped at [`MAX_PAGE_SIZE`].
    pub async fn list_user_appointments(
        &self,
        user_id: i64,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Appointment>, ShowingError> {
        if page == 0 {
            return Err(ShowingError::Validation("page starts at 1".to_string()));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ShowingError::Validation(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        self.timeout
            .run(
                "get_appointments_by_user",
                self.store.get_appointments_by_user(user_id, page, page_size),
            )
            .await
    }

    /// Appointments bound to an agent on `date`, by start time.
    pub async fn list_realtor_appointments(
        &self,
        realtor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, ShowingError> {
        self.timeout
            .run(
                "get_appointments_by_realtor",
                self.store.get_appointments_by_realtor(realtor_id, date),
            )
            .await
    }

    /// Every appointment of a store on `date`, by start time.
    pub async fn list_store_appointments(
        &self,
        store_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, ShowingError> {
        self.timeout
            .run(
                "get_appointments_by_store",
                self.store.get_appointments_by_store(store_id, date),
            )
            .await
    }

    /// Appointments of a store waiting for an agent on `date`, in queue order.
    pub async fn queued_appointments(
        &self,
        store_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, ShowingError> {
        self.queue.queued(store_id, date).await
    }

    /// How many queued appointments start at `start_time`.
    pub async fn queue_count(
        &self,
        store_id: i64,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> Result<u32, ShowingError> {
        self.queue.count_at(store_id, date, start_time).await
    }

    /// The audit trail of an appointment, oldest entry first.
    pub async fn appointment_logs(
        &self,
        appointment_id: i64,
    ) -> Result<Vec<AppointmentLog>, ShowingError> {
        self.get_appointment(appointment_id).await?;
        self.timeout
            .run(
                "get_appointment_logs",
                self.store.get_appointment_logs(appointment_id),
            )
            .await
    }

    /// Bookable slots of a store over `days` days from `start_date`.
    pub async fn available_slots(
        &self,
        store_id: i64,
        start_date: NaiveDate,
        days: u32,
    ) -> Result<Vec<TimeSlot>, ShowingError> {
        self.slots.available_slots(store_id, start_date, days).await
    }
}
