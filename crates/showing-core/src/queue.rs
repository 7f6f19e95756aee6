// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue position policy for appointments waiting on an agent.
//!
//! The arithmetic lives here, free of I/O, so storage adapters can apply it
//! inside the same transaction that changes the queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pending appointment waiting in a `(store_id, date)` queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEntry {
    pub appointment_id: i64,
    pub created_at: DateTime<Utc>,
}

/// The position and wait estimate a queued appointment should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueAssignment {
    pub appointment_id: i64,
    pub position: u32,
    pub estimated_wait_minutes: u32,
}

/// Queue ordering and wait estimation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuePolicy {
    /// Average minutes an agent spends per appointment.
    pub average_service_minutes: u32,
}

impl Default for QueuePolicy {
    fn default() -> Self {
        Self {
            average_service_minutes: 30,
        }
    }
}

impl QueuePolicy {
    pub fn new(average_service_minutes: u32) -> Self {
        Self {
            average_service_minutes,
        }
    }

    /// Position for an appointment joining a queue of `current_len` entries.
    pub fn next_position(&self, current_len: u32) -> u32 {
        current_len.saturating_add(1)
    }

    /// Estimated wait for a queue position. Non-decreasing in `position`.
    pub fn estimate_wait_minutes(&self, position: u32) -> u32 {
        position.saturating_mul(self.average_service_minutes)
    }

    /// Re-derive contiguous positions `1..=N` in FIFO order.
    ///
    /// Entries are ordered by creation time, ties broken by id ascending.
    pub fn assign_positions(&self, mut entries: Vec<QueueEntry>) -> Vec<QueueAssignment> {
        entries.sort_by_key(|e| (e.created_at, e.appointment_id));
        entries
            .into_iter()
            .zip(1u32..)
            .map(|(entry, position)| QueueAssignment {
                appointment_id: entry.appointment_id,
                position,
                estimated_wait_minutes: self.estimate_wait_minutes(position),
            })
            .collect()
    }
}
