// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment scheduling and queueing engine.
//!
//! - [`ConflictChecker`] decides whether a window overlaps an active booking.
//! - [`QueueAllocator`] inspects and recomputes `(store, date)` queues.
//! - [`SlotCalculator`] produces bookable slots with capacity annotations.
//! - [`AppointmentManager`] ties them together behind the lifecycle
//!   operations, with every store call bounded by the configured timeout.

pub mod code;
pub mod conflict;
pub mod lifecycle;
pub mod queue;
pub mod requests;
pub mod slots;
pub mod timeout;
pub mod validation;

pub use code::{CodeSource, RandomCodes};
pub use conflict::{ConflictChecker, Subject};
pub use lifecycle::AppointmentManager;
pub use queue::QueueAllocator;
pub use requests::{BookingRequest, ValidatedBooking};
pub use slots::SlotCalculator;
pub use timeout::StoreTimeout;
pub use validation::RequestValidator;
