// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All traits use `#[async_trait]` so they can be held as trait objects.

pub mod adapter;
pub mod directory;
pub mod store;

pub use adapter::StorageAdapter;
pub use directory::StoreDirectory;
pub use store::AppointmentStore;
