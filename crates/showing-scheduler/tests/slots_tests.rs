// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slot availability and audit logging over a seeded store.

use chrono::NaiveTime;
use showing_core::{Operator, ShowingError};
use showing_test_utils::{STORE_ID, TestHarness};
use tracing_test::traced_test;

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

#[tokio::test]
async fn slots_reflect_bookings_and_queue() {
    let h = TestHarness::builder().with_realtors(2).build().await.unwrap();
    for user in 0..3 {
        h.manager
            .create_appointment(TestHarness::booking(10 + user, "14:00", 60))
            .await
            .unwrap();
    }

    let slots = h
        .manager
        .available_slots(STORE_ID, TestHarness::today(), 1)
        .await
        .unwrap();
    assert_eq!(slots.len(), 9, "hourly slots from 09:00 to 18:00");
    assert!(slots.iter().all(|s| s.booked_count <= s.total_capacity));

    let two_pm = slots.iter().find(|s| s.start_time == hm(14, 0)).unwrap();
    assert_eq!(two_pm.total_capacity, 2);
    assert_eq!(two_pm.booked_count, 2);
    assert!(!two_pm.available);
    assert!(two_pm.available_realtors.is_empty());
    assert_eq!(two_pm.queue_count, 1);

    let three_pm = slots.iter().find(|s| s.start_time == hm(15, 0)).unwrap();
    assert!(three_pm.available);
    assert_eq!(three_pm.available_realtors, vec![1, 2]);
    assert_eq!(three_pm.queue_count, 0);
}

#[tokio::test]
async fn cancelled_bookings_free_their_slot() {
    let h = TestHarness::builder().with_realtors(1).build().await.unwrap();
    let a = h
        .manager
        .create_appointment(TestHarness::booking(10, "10:00", 60))
        .await
        .unwrap();
    h.manager
        .cancel_appointment(a.id, Operator::customer(10), None)
        .await
        .unwrap();

    let slots = h
        .manager
        .available_slots(STORE_ID, TestHarness::today(), 1)
        .await
        .unwrap();
    let ten = slots.iter().find(|s| s.start_time == hm(10, 0)).unwrap();
    assert_eq!(ten.booked_count, 0);
    assert!(ten.available);
}

#[tokio::test]
async fn slot_range_is_capped_and_scoped() {
    let h = TestHarness::builder().with_realtors(1).build().await.unwrap();

    let slots = h
        .manager
        .available_slots(STORE_ID, TestHarness::today(), 365)
        .await
        .unwrap();
    let max_days = h.config.scheduling.max_slot_days as usize;
    assert_eq!(slots.len(), 9 * max_days);

    assert!(
        h.manager
            .available_slots(STORE_ID, TestHarness::today(), 0)
            .await
            .unwrap()
            .is_empty()
    );

    let err = h
        .manager
        .available_slots(99, TestHarness::today(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ShowingError::NotFound { entity: "store", .. }));

    let closed = TestHarness::builder()
        .with_realtors(1)
        .with_inactive_store()
        .build()
        .await
        .unwrap();
    assert!(
        closed
            .manager
            .available_slots(STORE_ID, TestHarness::today(), 3)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn agents_off_shift_are_not_offered() {
    let h = TestHarness::builder()
        .with_realtors(2)
        .with_realtor_hours(2, hm(13, 0), hm(18, 0))
        .build()
        .await
        .unwrap();
    let slots = h
        .manager
        .available_slots(STORE_ID, TestHarness::today(), 1)
        .await
        .unwrap();

    let nine = slots.iter().find(|s| s.start_time == hm(9, 0)).unwrap();
    assert_eq!(nine.available_realtors, vec![1]);
    let four_pm = slots.iter().find(|s| s.start_time == hm(16, 0)).unwrap();
    assert_eq!(four_pm.available_realtors, vec![1, 2]);
}

#[traced_test]
#[tokio::test]
async fn lifecycle_events_are_logged() {
    let h = TestHarness::builder().with_realtors(1).build().await.unwrap();
    let a = h
        .manager
        .create_appointment(TestHarness::booking(10, "10:00", 30))
        .await
        .unwrap();
    h.manager.accept_appointment(a.id, 1).await.unwrap();
    let _ = h.manager.complete_appointment(a.id, 1).await;

    assert!(logs_contain("appointment created"));
    assert!(logs_contain("appointment transitioned"));
    assert!(logs_contain("transition rejected"));
    assert!(logs_contain(&a.appointment_code));
}
