// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Showing integration tests.
//!
//! Provides deterministic collaborators and a harness that wires a real
//! SQLite store in a temp directory to an [`AppointmentManager`].
//!
//! # Components
//!
//! - [`FixedClock`] - Settable clock for deterministic "now"
//! - [`TestHarness`] - Seeded store, agents and working hours plus a manager
//! - [`UnreachableStore`] - Panics on any call, proving a path does no I/O
//! - [`StallingDirectory`] - Never answers, for timeout tests
//!
//! [`AppointmentManager`]: showing_scheduler::AppointmentManager

pub mod clock;
pub mod harness;
pub mod mock_store;

pub use clock::FixedClock;
pub use harness::{STORE_ID, TestHarness, TestHarnessBuilder};
pub use mock_store::{SequenceCodes, StallingDirectory, UnreachableStore};
