// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only view of the store and agent directory.

use async_trait::async_trait;
use chrono::Weekday;

use crate::error::ShowingError;
use crate::schedule::{RealtorProfile, StoreProfile, WorkingHours};

/// Store and agent records owned by directory management.
#[async_trait]
pub trait StoreDirectory: Send + Sync + 'static {
    async fn get_store(&self, store_id: i64) -> Result<Option<StoreProfile>, ShowingError>;

    /// All agents assigned to the store, active or not, ordered by id.
    async fn list_store_realtors(
        &self,
        store_id: i64,
    ) -> Result<Vec<RealtorProfile>, ShowingError>;

    /// Active opening intervals for the weekday, ordered by opening time.
    async fn store_working_hours(
        &self,
        store_id: i64,
        weekday: Weekday,
    ) -> Result<Vec<WorkingHours>, ShowingError>;

    /// Active intervals for an agent. Empty means the agent follows store hours.
    async fn realtor_working_hours(
        &self,
        realtor_id: i64,
        weekday: Weekday,
    ) -> Result<Vec<WorkingHours>, ShowingError>;
}
