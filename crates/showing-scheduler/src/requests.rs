// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound request shapes, as they arrive from the API boundary.

use serde::{Deserialize, Serialize};
use showing_core::TimeWindow;

/// A customer's request to book an appointment.
///
/// Dates and times are unparsed text (`YYYY-MM-DD`, `HH:MM`); validation
/// turns this into a [`ValidatedBooking`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub user_id: i64,
    pub store_id: i64,
    /// Preferred agent. `None` lets the engine pick one or queue.
    #[serde(default)]
    pub realtor_id: Option<i64>,
    pub appointment_date: String,
    pub start_time: String,
    pub duration_minutes: u32,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub requirements: Option<String>,
}

/// A booking whose fields passed every check that needs no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBooking {
    pub user_id: i64,
    pub store_id: i64,
    pub preferred_realtor: Option<i64>,
    pub window: TimeWindow,
    pub customer_name: String,
    pub customer_phone: String,
    pub requirements: Option<String>,
}
