// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bookable slot computation for a store over a range of dates.
//!
//! Slots are cut at a fixed granularity inside each of the store's opening
//! intervals for the weekday. Only bookings bound to one of the store's
//! active agents count towards `booked_count`; queued bookings are reported
//! through `queue_count` instead. Since an agent never holds two overlapping
//! bookings, the peak of concurrent bound bookings cannot exceed the number
//! of active agents.

use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate, TimeDelta};
use showing_core::{
    Appointment, AppointmentStore, ShowingError, StoreDirectory, TimeSlot, TimeWindow,
    WorkingHours,
};
use tracing::debug;

use crate::conflict::{overlapping, peak_concurrency};
use crate::timeout::StoreTimeout;

/// An active agent and their own hours for the day. Empty hours mean the
/// agent follows the store's hours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDay {
    pub realtor_id: i64,
    pub hours: Vec<WorkingHours>,
}

impl AgentDay {
    fn works(&self, window: &TimeWindow) -> bool {
        self.hours.is_empty() || self.hours.iter().any(|h| h.covers(window.start, window.end))
    }
}

#[derive(Clone)]
pub struct SlotCalculator {
    store: Arc<dyn AppointmentStore>,
    directory: Arc<dyn StoreDirectory>,
    granularity_minutes: u32,
    max_days: u32,
    timeout: StoreTimeout,
}

impl SlotCalculator {
    /// Slots are `granularity_minutes` long; a query spans at most
    /// `max_days` dates.
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        directory: Arc<dyn StoreDirectory>,
        granularity_minutes: u32,
        max_days: u32,
        timeout: StoreTimeout,
    ) -> Self {
        Self {
            store,
            directory,
            granularity_minutes,
            max_days,
            timeout,
        }
    }

    /// Slots for `days` dates starting at `start_date`, capped at the
    /// configured maximum. An inactive store has no slots.
    pub async fn available_slots(
        &self,
        store_id: i64,
        start_date: NaiveDate,
        days: u32,
    ) -> Result<Vec<TimeSlot>, ShowingError> {
        let days = days.min(self.max_days);
        if days == 0 {
            return Ok(Vec::new());
        }

        let store = self
            .timeout
            .run("get_store", self.directory.get_store(store_id))
            .await?
            .ok_or_else(|| ShowingError::NotFound {
                entity: "store",
                key: store_id.to_string(),
            })?;
        if !store.active {
            return Ok(Vec::new());
        }

        let realtors = self
            .timeout
            .run("list_store_realtors", self.directory.list_store_realtors(store_id))
            .await?;
        let bookings = self
            .timeout
            .run(
                "get_store_bookings",
                self.store.get_store_bookings(store_id, start_date, days),
            )
            .await?;

        let mut slots = Vec::new();
        for offset in 0..days {
            let Some(date) = start_date.checked_add_days(Days::new(u64::from(offset))) else {
                break;
            };
            let weekday = date.weekday();
            let mut store_hours = self
                .timeout
                .run(
                    "store_working_hours",
                    self.directory.store_working_hours(store_id, weekday),
                )
                .await?;
            if store_hours.is_empty() {
                continue;
            }
            store_hours.sort_by_key(|h| h.open);

            let mut agents = Vec::new();
            for realtor in realtors.iter().filter(|r| r.active) {
                let hours = self
                    .timeout
                    .run(
                        "realtor_working_hours",
                        self.directory.realtor_working_hours(realtor.id, weekday),
                    )
                    .await?;
                agents.push(AgentDay {
                    realtor_id: realtor.id,
                    hours,
                });
            }

            let day_bookings: Vec<Appointment> = bookings
                .iter()
                .filter(|b| b.appointment_date == date)
                .cloned()
                .collect();
            slots.extend(day_slots(
                date,
                &store_hours,
                &agents,
                &day_bookings,
                self.granularity_minutes,
            ));
        }

        debug!(store_id, %start_date, days, slots = slots.len(), "slots computed");
        Ok(slots)
    }
}

/// Slots for one date. Pure; `bookings` may include other dates and
/// inactive rows, which are ignored.
pub fn day_slots(
    date: NaiveDate,
    store_hours: &[WorkingHours],
    agents: &[AgentDay],
    bookings: &[Appointment],
    granularity_minutes: u32,
) -> Vec<TimeSlot> {
    let mut slots = Vec::new();
    if granularity_minutes == 0 {
        return slots;
    }
    let step = TimeDelta::minutes(i64::from(granularity_minutes));
    let holds_store_agent = |booking: &Appointment| {
        booking.holds_realtor() && agents.iter().any(|a| booking.realtor_id == Some(a.realtor_id))
    };

    for interval in store_hours {
        let mut start = interval.open;
        loop {
            let (end, wrapped) = start.overflowing_add_signed(step);
            if wrapped != 0 || end > interval.close {
                break;
            }
            let window = TimeWindow { date, start, end };

            let bound: Vec<TimeWindow> = overlapping(&window, bookings)
                .filter(|b| holds_store_agent(b))
                .map(|b| TimeWindow {
                    date,
                    start: b.start_time.max(start),
                    end: b.end_time.min(end),
                })
                .collect();

            let available_realtors: Vec<i64> = agents
                .iter()
                .filter(|agent| agent.works(&window))
                .filter(|agent| {
                    !overlapping(&window, bookings).any(|b| b.realtor_id == Some(agent.realtor_id))
                })
                .map(|agent| agent.realtor_id)
                .collect();

            let queue_count = bookings
                .iter()
                .filter(|b| {
                    b.appointment_date == date
                        && b.is_queued()
                        && b.status.is_active()
                        && start <= b.start_time
                        && b.start_time < end
                })
                .count() as u32;

            let total_capacity = agents.len() as u32;
            let booked_count = peak_concurrency(&bound);
            slots.push(TimeSlot {
                date,
                start_time: start,
                end_time: end,
                available: booked_count < total_capacity,
                available_realtors,
                total_capacity,
                booked_count,
                queue_count,
            });
            start = end;
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, Utc, Weekday};
    use showing_core::AppointmentStatus;

    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn hours(open: u32, close: u32) -> WorkingHours {
        WorkingHours {
            weekday: Weekday::Mon,
            open: t(open, 0),
            close: t(close, 0),
        }
    }

    fn agent(id: i64) -> AgentDay {
        AgentDay {
            realtor_id: id,
            hours: Vec::new(),
        }
    }

    fn booking(id: i64, realtor: Option<i64>, start: NaiveTime, minutes: u32) -> Appointment {
        let window = TimeWindow::starting_at(date(), start, minutes).unwrap();
        let now = Utc::now();
        Appointment {
            id,
            appointment_code: format!("C{id:05}"),
            user_id: 100 + id,
            store_id: 1,
            realtor_id: realtor,
            appointment_date: date(),
            start_time: window.start,
            end_time: window.end,
            duration_minutes: minutes,
            queue_position: if realtor.is_none() { id as u32 } else { 0 },
            estimated_wait_minutes: 0,
            status: AppointmentStatus::Pending,
            customer_name: "c".into(),
            customer_phone: "555-0100".into(),
            requirements: None,
            cancel_reason: None,
            confirmed_at: None,
            completed_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn slots_tile_each_opening_interval() {
        let slots = day_slots(date(), &[hours(9, 12), hours(13, 15)], &[agent(1)], &[], 60);
        let starts: Vec<_> = slots.iter().map(|s| s.start_time).collect();
        assert_eq!(starts, vec![t(9, 0), t(10, 0), t(11, 0), t(13, 0), t(14, 0)]);
        assert!(slots.iter().all(|s| s.available && s.total_capacity == 1));
    }

    #[test]
    fn trailing_partial_slot_is_dropped() {
        let interval = WorkingHours {
            weekday: Weekday::Mon,
            open: t(9, 0),
            close: t(10, 30),
        };
        let slots = day_slots(date(), &[interval], &[agent(1)], &[], 60);
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn bound_and_queued_bookings_are_counted_separately() {
        let bookings = vec![
            booking(1, Some(1), t(14, 0), 60),
            booking(2, None, t(14, 30), 30),
        ];
        let slots = day_slots(date(), &[hours(9, 18)], &[agent(1), agent(2)], &bookings, 60);
        let two_pm = slots.iter().find(|s| s.start_time == t(14, 0)).unwrap();
        assert_eq!(two_pm.booked_count, 1);
        assert_eq!(two_pm.queue_count, 1);
        assert_eq!(two_pm.available_realtors, vec![2]);
        assert!(two_pm.available);

        let three_pm = slots.iter().find(|s| s.start_time == t(15, 0)).unwrap();
        assert_eq!((three_pm.booked_count, three_pm.queue_count), (0, 0));
    }

    #[test]
    fn sequential_bookings_in_one_slot_do_not_exhaust_capacity() {
        let bookings = vec![
            booking(1, Some(1), t(14, 0), 30),
            booking(2, Some(2), t(14, 30), 30),
        ];
        let slots = day_slots(date(), &[hours(14, 15)], &[agent(1), agent(2)], &bookings, 60);
        assert_eq!(slots[0].booked_count, 1);
        assert!(slots[0].available);
        assert!(slots[0].available_realtors.is_empty());
    }

    #[test]
    fn full_slot_is_unavailable() {
        let bookings = vec![booking(1, Some(1), t(10, 0), 60)];
        let slots = day_slots(date(), &[hours(10, 11)], &[agent(1)], &bookings, 60);
        assert_eq!(slots[0].booked_count, 1);
        assert!(!slots[0].available);
    }

    #[test]
    fn cancelled_bookings_and_foreign_agents_are_ignored() {
        let mut cancelled = booking(1, Some(1), t(10, 0), 60);
        cancelled.status = AppointmentStatus::Cancelled;
        let foreign = booking(2, Some(99), t(10, 0), 60);
        let mut finished = booking(3, Some(1), t(10, 0), 30);
        finished.status = AppointmentStatus::Completed;
        let slots = day_slots(
            date(),
            &[hours(10, 11)],
            &[agent(1)],
            &[cancelled, foreign, finished],
            60,
        );
        assert_eq!(slots[0].booked_count, 0);
        assert_eq!(slots[0].available_realtors, vec![1]);
    }

    #[test]
    fn agent_hours_limit_availability() {
        let part_time = AgentDay {
            realtor_id: 2,
            hours: vec![hours(9, 12)],
        };
        let slots = day_slots(date(), &[hours(9, 14)], &[agent(1), part_time], &[], 60);
        let eleven = slots.iter().find(|s| s.start_time == t(11, 0)).unwrap();
        let noon = slots.iter().find(|s| s.start_time == t(12, 0)).unwrap();
        assert_eq!(eleven.available_realtors, vec![1, 2]);
        assert_eq!(noon.available_realtors, vec![1]);
    }

    #[test]
    fn no_agents_means_no_capacity() {
        let slots = day_slots(date(), &[hours(9, 10)], &[], &[], 30);
        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(|s| !s.available && s.total_capacity == 0));
    }
}
