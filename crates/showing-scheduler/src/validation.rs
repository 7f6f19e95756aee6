// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field validation for booking requests.
//!
//! Everything here is pure: no store or directory access. The lifecycle
//! manager runs these checks before its first store call.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use showing_config::model::{BookingConfig, SchedulingConfig};
use showing_core::{AppointmentDetails, ShowingError, TimeWindow};

use crate::requests::{BookingRequest, ValidatedBooking};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validates booking requests against the configured limits.
#[derive(Debug, Clone)]
pub struct RequestValidator {
    allowed_durations: Vec<u32>,
    max_advance_days: u32,
    booking: BookingConfig,
}

impl RequestValidator {
    pub fn new(scheduling: &SchedulingConfig, booking: &BookingConfig) -> Self {
        Self {
            allowed_durations: scheduling.allowed_durations.clone(),
            max_advance_days: scheduling.max_advance_days,
            booking: booking.clone(),
        }
    }

    /// Check a booking request relative to the store-local time `now`.
    pub fn validate_booking(
        &self,
        request: &BookingRequest,
        now: NaiveDateTime,
    ) -> Result<ValidatedBooking, ShowingError> {
        self.check_duration(request.duration_minutes)?;
        require_id("user_id", request.user_id)?;
        require_id("store_id", request.store_id)?;
        if let Some(realtor_id) = request.realtor_id {
            require_id("realtor_id", realtor_id)?;
        }
        let details = self.validate_details(&AppointmentDetails {
            customer_name: request.customer_name.clone(),
            customer_phone: request.customer_phone.clone(),
            requirements: request.requirements.clone(),
        })?;

        let date = parse_date(&request.appointment_date)?;
        let start = parse_time(&request.start_time)?;
        let window = TimeWindow::starting_at(date, start, request.duration_minutes).ok_or_else(|| {
            invalid(format!(
                "a {} minute appointment starting at {start} would run past midnight",
                request.duration_minutes
            ))
        })?;
        self.check_horizon(&window, now)?;

        Ok(ValidatedBooking {
            user_id: request.user_id,
            store_id: request.store_id,
            preferred_realtor: request.realtor_id,
            window,
            customer_name: details.customer_name,
            customer_phone: details.customer_phone,
            requirements: details.requirements,
        })
    }

    /// Trim and bound the customer-editable fields.
    pub fn validate_details(
        &self,
        details: &AppointmentDetails,
    ) -> Result<AppointmentDetails, ShowingError> {
        let name = details.customer_name.trim();
        if name.is_empty() {
            return Err(invalid("customer_name is required"));
        }
        if name.chars().count() > self.booking.max_name_len {
            return Err(invalid(format!(
                "customer_name must be at most {} characters",
                self.booking.max_name_len
            )));
        }

        let phone = details.customer_phone.trim();
        if phone.is_empty() {
            return Err(invalid("customer_phone is required"));
        }
        let phone_len = phone.chars().count();
        if phone_len < self.booking.min_phone_len || phone_len > self.booking.max_phone_len {
            return Err(invalid(format!(
                "customer_phone must be {} to {} characters",
                self.booking.min_phone_len, self.booking.max_phone_len
            )));
        }
        if !phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
        {
            return Err(invalid("customer_phone may only contain digits, spaces and + - ( )"));
        }

        let requirements = details
            .requirements
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());
        if let Some(text) = requirements
            && text.chars().count() > self.booking.max_requirements_len
        {
            return Err(invalid(format!(
                "requirements must be at most {} characters",
                self.booking.max_requirements_len
            )));
        }

        Ok(AppointmentDetails {
            customer_name: name.to_string(),
            customer_phone: phone.to_string(),
            requirements: requirements.map(str::to_string),
        })
    }

    fn check_duration(&self, minutes: u32) -> Result<(), ShowingError> {
        if self.allowed_durations.contains(&minutes) {
            return Ok(());
        }
        let allowed: Vec<String> = self.allowed_durations.iter().map(u32::to_string).collect();
        Err(invalid(format!(
            "duration_minutes must be one of [{}], got {minutes}",
            allowed.join(", ")
        )))
    }

    fn check_horizon(&self, window: &TimeWindow, now: NaiveDateTime) -> Result<(), ShowingError> {
        if window.date.and_time(window.start) <= now {
            return Err(invalid(format!(
                "{} {} is not in the future",
                window.date, window.start
            )));
        }
        let last = now
            .date()
            .checked_add_days(Days::new(u64::from(self.max_advance_days)))
            .unwrap_or(NaiveDate::MAX);
        if window.date > last {
            return Err(invalid(format!(
                "appointments can be booked at most {} days ahead",
                self.max_advance_days
            )));
        }
        Ok(())
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ShowingError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| invalid(format!("appointment_date `{raw}` is not a YYYY-MM-DD date")))
}

/// Accepts `HH:MM` and `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, ShowingError> {
    let raw_trimmed = raw.trim();
    NaiveTime::parse_from_str(raw_trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw_trimmed, "%H:%M:%S"))
        .map_err(|_| invalid(format!("start_time `{raw}` is not an HH:MM time")))
}

fn require_id(field: &str, id: i64) -> Result<(), ShowingError> {
    if id > 0 {
        Ok(())
    } else {
        Err(invalid(format!("{field} is required")))
    }
}

fn invalid(message: impl Into<String>) -> ShowingError {
    ShowingError::Validation(message.into())
}
