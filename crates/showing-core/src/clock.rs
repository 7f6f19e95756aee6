// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time source injected into the scheduling engine.

use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// Supplies the current time.
///
/// Appointment dates and times are wall-clock values in the store's local
/// time, while audit timestamps are UTC.
pub trait Clock: Send + Sync + 'static {
    /// Current instant, used for audit timestamps.
    fn now(&self) -> DateTime<Utc>;

    /// Current wall-clock time used to decide whether a request is in the future.
    fn local_now(&self) -> NaiveDateTime {
        self.now().with_timezone(&Local).naive_local()
    }
}

/// The operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
