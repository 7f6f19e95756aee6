// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory records and computed slot views.

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A store as seen by the scheduling core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreProfile {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

/// An agent assigned to a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtorProfile {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub active: bool,
}

/// An active opening interval on one day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub weekday: Weekday,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl WorkingHours {
    /// Whether `[start, end)` fits inside this interval.
    pub fn covers(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.open <= start && end <= self.close
    }
}

/// A computed, never persisted, bookable window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub available: bool,
    pub available_realtors: Vec<i64>,
    pub total_capacity: u32,
    pub booked_count: u32,
    pub queue_count: u32,
}
