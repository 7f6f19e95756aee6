// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The appointment entity, its status state machine, and audit log records.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle status of an appointment.
///
/// `pending → confirmed → in_progress → completed`, with `cancelled`
/// reachable from `pending` and `confirmed`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Statuses that still occupy a customer's or agent's time.
    pub const ACTIVE: [AppointmentStatus; 3] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::InProgress,
    ];

    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(self) -> bool {
        match self {
            Self::Completed | Self::Cancelled => true,
            Self::Pending | Self::Confirmed | Self::InProgress => false,
        }
    }

    /// Whether the appointment takes part in conflict detection.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// The complete transition table.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        match self {
            Pending => matches!(next, Confirmed | Cancelled),
            Confirmed => matches!(next, InProgress | Cancelled),
            InProgress => matches!(next, Completed),
            Completed | Cancelled => false,
        }
    }
}

/// A lifecycle operation requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// An agent claims a pending appointment.
    Accept,
    /// The bound agent begins the service.
    Start,
    /// The bound agent finishes the service.
    Complete,
    /// The appointment is called off.
    Cancel,
}

impl Transition {
    /// The status an appointment ends up in after this transition.
    pub fn target(self) -> AppointmentStatus {
        match self {
            Self::Accept => AppointmentStatus::Confirmed,
            Self::Start => AppointmentStatus::InProgress,
            Self::Complete => AppointmentStatus::Completed,
            Self::Cancel => AppointmentStatus::Cancelled,
        }
    }

    /// Whether this transition may be applied to an appointment in `from`.
    pub fn permitted_from(self, from: AppointmentStatus) -> bool {
        from.can_transition_to(self.target())
    }
}

/// Who performed an operation, for the audit log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OperatorType {
    Customer,
    Realtor,
    Store,
    System,
}

/// An operator type with an optional identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub kind: OperatorType,
    pub id: Option<i64>,
}

impl Operator {
    pub fn customer(id: i64) -> Self {
        Self {
            kind: OperatorType::Customer,
            id: Some(id),
        }
    }

    pub fn realtor(id: i64) -> Self {
        Self {
            kind: OperatorType::Realtor,
            id: Some(id),
        }
    }

    pub fn system() -> Self {
        Self {
            kind: OperatorType::System,
            id: None,
        }
    }
}

/// A half-open `[start, end)` window on a single calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Build a window of `duration_minutes` starting at `start`.
    ///
    /// Returns `None` when the duration is zero or the window would run past
    /// midnight; appointments never span two dates.
    pub fn starting_at(date: NaiveDate, start: NaiveTime, duration_minutes: u32) -> Option<Self> {
        if duration_minutes == 0 {
            return None;
        }
        let (end, wrapped) =
            start.overflowing_add_signed(TimeDelta::minutes(i64::from(duration_minutes)));
        if wrapped != 0 {
            return None;
        }
        Some(Self { date, start, end })
    }

    /// Length of the window in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Half-open overlap: `s1 < e2 && s2 < e1` on the same date.
    ///
    /// Back-to-back windows (`e1 == s2`) do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.date == other.date && self.start < other.end && other.start < self.end
    }
}

/// A persisted appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub appointment_code: String,
    pub user_id: i64,
    pub store_id: i64,
    pub realtor_id: Option<i64>,
    pub appointment_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: u32,
    /// 0 when not queued.
    pub queue_position: u32,
    pub estimated_wait_minutes: u32,
    pub status: AppointmentStatus,
    pub customer_name: String,
    pub customer_phone: String,
    pub requirements: Option<String>,
    pub cancel_reason: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            date: self.appointment_date,
            start: self.start_time,
            end: self.end_time,
        }
    }

    /// Waiting in the store queue for an agent.
    pub fn is_queued(&self) -> bool {
        self.queue_position > 0
    }

    /// Holding an agent: active and bound to a realtor.
    pub fn holds_realtor(&self) -> bool {
        self.status.is_active() && self.realtor_id.is_some()
    }
}

/// How the store should bind an agent when persisting a new appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// The customer asked for this agent; a conflict rejects the booking.
    Preferred(i64),
    /// Bind the first conflict-free agent in order, or queue if none is free.
    FirstAvailable(Vec<i64>),
}

/// A validated booking ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub appointment_code: String,
    pub user_id: i64,
    pub store_id: i64,
    pub window: TimeWindow,
    pub customer_name: String,
    pub customer_phone: String,
    pub requirements: Option<String>,
    pub assignment: Assignment,
    pub operator: Operator,
    pub created_at: DateTime<Utc>,
}

/// Customer-editable fields of an appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDetails {
    pub customer_name: String,
    pub customer_phone: String,
    pub requirements: Option<String>,
}

/// A status transition to apply atomically.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub appointment_id: i64,
    pub transition: Transition,
    /// Agent to bind on accept; the acting agent on start and complete.
    pub realtor_id: Option<i64>,
    /// Cancellation reason, also used as the log remark.
    pub reason: Option<String>,
    pub operator: Operator,
    pub at: DateTime<Utc>,
}

/// Immutable audit record of one transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentLog {
    pub id: i64,
    pub appointment_id: i64,
    /// `None` for the creation entry.
    pub old_status: Option<AppointmentStatus>,
    pub new_status: AppointmentStatus,
    pub operator_type: OperatorType,
    pub operator_id: Option<i64>,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}
