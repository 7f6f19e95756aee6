// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for appointments, their logs, the store queue and the directory.
//!
//! Async functions take a [`Database`](crate::Database) and run on the writer
//! thread. The `pub(crate)` synchronous helpers take a plain connection so
//! they can be composed inside one write transaction.

pub mod appointments;
pub mod conflicts;
pub mod directory;
pub mod logs;
pub mod queue;
pub mod transitions;

/// Statuses that take part in conflict detection, as stored.
pub(crate) const ACTIVE_STATUSES: &str = "('pending', 'confirmed', 'in_progress')";
