// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Showing appointment engine.
//!
//! Provides the domain types, the appointment state machine, the error type,
//! and the adapter traits that storage and directory backends implement.

pub mod appointment;
pub mod clock;
pub mod deadline;
pub mod error;
pub mod queue;
pub mod schedule;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use appointment::{
    Appointment, AppointmentDetails, AppointmentLog, AppointmentStatus, Assignment,
    NewAppointment, Operator, OperatorType, Page, StatusChange, TimeWindow, Transition,
};
pub use clock::{Clock, SystemClock};
pub use deadline::Deadline;
pub use error::{ConflictSubject, ShowingError};
pub use queue::{QueueAssignment, QueueEntry, QueuePolicy};
pub use schedule::{RealtorProfile, StoreProfile, TimeSlot, WorkingHours};
pub use types::HealthStatus;

pub use traits::{AppointmentStore, StorageAdapter, StoreDirectory};
