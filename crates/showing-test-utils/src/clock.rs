// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A settable clock.

use std::sync::Mutex;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use showing_core::Clock;

/// A clock frozen at a wall-clock instant until moved explicitly.
///
/// The local time doubles as UTC for audit timestamps.
#[derive(Debug)]
pub struct FixedClock {
    local: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn at(local: NaiveDateTime) -> Self {
        Self {
            local: Mutex::new(local),
        }
    }

    pub fn set(&self, local: NaiveDateTime) {
        *self.local.lock().unwrap_or_else(|e| e.into_inner()) = local;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut local = self.local.lock().unwrap_or_else(|e| e.into_inner());
        *local += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.local_now().and_utc()
    }

    fn local_now(&self) -> NaiveDateTime {
        *self.local.lock().unwrap_or_else(|e| e.into_inner())
    }
}
