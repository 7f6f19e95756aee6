// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle trait shared by storage backends.

use async_trait::async_trait;

use crate::error::ShowingError;
use crate::types::HealthStatus;

/// Lifecycle and health of a storage backend.
///
/// Backends are constructed cheaply and connect in [`initialize`](Self::initialize).
#[async_trait]
pub trait StorageAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this backend.
    fn name(&self) -> &str;

    /// Opens connections and applies pending migrations.
    async fn initialize(&self) -> Result<(), ShowingError>;

    /// Performs a health check and returns the backend's current status.
    async fn health_check(&self) -> Result<HealthStatus, ShowingError>;

    /// Flushes pending writes and releases connections.
    async fn close(&self) -> Result<(), ShowingError>;
}
