// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interval conflict checking for customers and agents.

use std::sync::Arc;

use showing_core::{Appointment, AppointmentStore, ShowingError, TimeWindow};
use tracing::debug;

use crate::timeout::StoreTimeout;

/// Whose calendar a window is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Customer(i64),
    Realtor(i64),
}

/// Read-only overlap checks against active bookings in the store.
#[derive(Clone)]
pub struct ConflictChecker {
    store: Arc<dyn AppointmentStore>,
    timeout: StoreTimeout,
}

impl ConflictChecker {
    pub fn new(store: Arc<dyn AppointmentStore>, timeout: StoreTimeout) -> Self {
        Self { store, timeout }
    }

    /// Whether `subject` holds an active booking overlapping `window`,
    /// ignoring the appointment `exclude` if given.
    pub async fn has_conflict(
        &self,
        subject: Subject,
        window: TimeWindow,
        exclude: Option<i64>,
    ) -> Result<bool, ShowingError> {
        let conflict = match subject {
            Subject::Customer(user_id) => {
                self.timeout
                    .run(
                        "check_user_time_conflict",
                        self.store.check_user_time_conflict(user_id, window, exclude),
                    )
                    .await?
            }
            Subject::Realtor(realtor_id) => {
                self.timeout
                    .run(
                        "check_realtor_time_conflict",
                        self.store
                            .check_realtor_time_conflict(realtor_id, window, exclude),
                    )
                    .await?
            }
        };
        debug!(?subject, date = %window.date, start = %window.start, end = %window.end, conflict, "conflict check");
        Ok(conflict)
    }
}

/// Active bookings in `bookings` that overlap `window`.
pub fn overlapping<'a>(
    window: &'a TimeWindow,
    bookings: &'a [Appointment],
) -> impl Iterator<Item = &'a Appointment> + 'a {
    bookings
        .iter()
        .filter(move |b| b.status.is_active() && b.window().overlaps(window))
}

/// The largest number of `windows` in progress at the same instant.
///
/// Windows are half-open, so one ending exactly when another starts does
/// not count as concurrent.
pub fn peak_concurrency(windows: &[TimeWindow]) -> u32 {
    windows
        .iter()
        .map(|at| {
            windows
                .iter()
                .filter(|w| w.date == at.date && w.start <= at.start && at.start < w.end)
                .count() as u32
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use proptest::prelude::*;

    use super::*;

    fn w(start: u32, minutes: u32) -> TimeWindow {
        TimeWindow::starting_at(
            NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap() + chrono::TimeDelta::minutes(i64::from(start)),
            minutes,
        )
        .unwrap()
    }

    #[test]
    fn peak_counts_nested_and_chained_windows() {
        assert_eq!(peak_concurrency(&[]), 0);
        assert_eq!(peak_concurrency(&[w(600, 60)]), 1);
        // back to back
        assert_eq!(peak_concurrency(&[w(600, 60), w(660, 60)]), 1);
        assert_eq!(peak_concurrency(&[w(600, 120), w(630, 30), w(640, 10)]), 3);
        assert_eq!(peak_concurrency(&[w(600, 60), w(630, 60), w(680, 60)]), 2);
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric_and_matches_minute_sweep(
            a_start in 0u32..1300, a_len in 1u32..120,
            b_start in 0u32..1300, b_len in 1u32..120,
        ) {
            let a = w(a_start, a_len);
            let b = w(b_start, b_len);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));

            let shared_minute = (a_start..a_start + a_len).any(|m| b_start <= m && m < b_start + b_len);
            prop_assert_eq!(a.overlaps(&b), shared_minute);
        }

        #[test]
        fn peak_matches_minute_sweep(
            spans in proptest::collection::vec((0u32..600, 1u32..90), 0..12)
        ) {
            let windows: Vec<_> = spans.iter().map(|&(s, l)| w(s, l)).collect();
            let swept = (0u32..700)
                .map(|m| spans.iter().filter(|&&(s, l)| s <= m && m < s + l).count() as u32)
                .max()
                .unwrap_or(0);
            prop_assert_eq!(peak_concurrency(&windows), swept);
        }
    }
}
