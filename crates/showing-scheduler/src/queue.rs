// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue inspection and recomputation for `(store, date)` scopes.
//!
//! Positions for new appointments are allocated by the store inside the
//! creating transaction; this type covers everything that happens after.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use showing_core::{Appointment, AppointmentStore, QueuePolicy, ShowingError};
use tracing::debug;

use crate::timeout::StoreTimeout;

#[derive(Clone)]
pub struct QueueAllocator {
    store: Arc<dyn AppointmentStore>,
    policy: QueuePolicy,
    timeout: StoreTimeout,
}

impl QueueAllocator {
    /// Queue operations against `store`, numbered under `policy`.
    pub fn new(store: Arc<dyn AppointmentStore>, policy: QueuePolicy, timeout: StoreTimeout) -> Self {
        Self {
            store,
            policy,
            timeout,
        }
    }

    /// Service-time assumptions behind wait estimates.
    pub fn policy(&self) -> QueuePolicy {
        self.policy
    }

    /// Queued appointments for the scope, position 1 first.
    pub async fn queued(&self, store_id: i64, date: NaiveDate) -> Result<Vec<Appointment>, ShowingError> {
        self.timeout
            .run("get_queued_appointments", self.store.get_queued_appointments(store_id, date))
            .await
    }

    /// Queued appointments starting exactly at `start_time`.
    pub async fn count_at(
        &self,
        store_id: i64,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> Result<u32, ShowingError> {
        self.timeout
            .run("get_queue_count", self.store.get_queue_count(store_id, date, start_time))
            .await
    }

    /// Rewrite the scope's positions to `1..=N` in FIFO order.
    pub async fn recompute_positions(&self, store_id: i64, date: NaiveDate) -> Result<(), ShowingError> {
        debug!(store_id, %date, "recomputing queue positions");
        let deadline = self.timeout.deadline();
        self.timeout
            .run_write(
                "update_queue_positions",
                deadline,
                self.store.update_queue_positions(store_id, date, self.policy, deadline),
            )
            .await
    }
}

/// Whether `queued` carries positions exactly `1..=N` in order.
pub fn is_contiguous(queued: &[Appointment]) -> bool {
    queued
        .iter()
        .zip(1u32..)
        .all(|(appointment, expected)| appointment.queue_position == expected)
}
