// SPDX-FileCopyrightText: 2026 Showing Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end lifecycle tests over a seeded SQLite store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveTime, TimeDelta};
use showing_config::model::ShowingConfig;
use showing_core::{
    AppointmentDetails, AppointmentStatus, Clock, ConflictSubject, Operator, OperatorType,
    ShowingError,
};
use showing_scheduler::queue::is_contiguous;
use showing_scheduler::{AppointmentManager, BookingRequest};
use showing_test_utils::{
    FixedClock, STORE_ID, SequenceCodes, StallingDirectory, TestHarness, UnreachableStore,
};

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn with_realtor(request: BookingRequest, realtor_id: i64) -> BookingRequest {
    BookingRequest {
        realtor_id: Some(realtor_id),
        ..request
    }
}

#[tokio::test]
async fn single_agent_books_then_queues_then_stays_contiguous() {
    let h = TestHarness::builder().with_realtors(1).build().await.unwrap();

    let a = h
        .manager
        .create_appointment(TestHarness::booking(10, "14:00", 60))
        .await
        .unwrap();
    assert_eq!(a.status, AppointmentStatus::Pending);
    assert_eq!(a.realtor_id, Some(1));
    assert_eq!(a.queue_position, 0);

    let b = h
        .manager
        .create_appointment(TestHarness::booking(11, "14:30", 30))
        .await
        .unwrap();
    assert_eq!(b.realtor_id, None);
    assert_eq!(b.queue_position, 1);
    assert!(b.estimated_wait_minutes > 0);

    let c = h
        .manager
        .create_appointment(TestHarness::booking(12, "14:00", 30))
        .await
        .unwrap();
    assert_eq!(c.queue_position, 2);

    h.manager
        .cancel_appointment(a.id, Operator::customer(10), Some("cannot make it".into()))
        .await
        .unwrap();
    let queued = h
        .manager
        .queued_appointments(STORE_ID, TestHarness::today())
        .await
        .unwrap();
    assert_eq!(queued.len(), 2);
    assert!(is_contiguous(&queued));
    assert_eq!(queued[0].id, b.id);

    h.manager
        .cancel_appointment(b.id, Operator::customer(11), None)
        .await
        .unwrap();
    let queued = h
        .manager
        .queued_appointments(STORE_ID, TestHarness::today())
        .await
        .unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!((queued[0].id, queued[0].queue_position), (c.id, 1));
}

#[tokio::test]
async fn unlisted_duration_fails_before_any_store_call() {
    let store = Arc::new(UnreachableStore);
    let clock = Arc::new(FixedClock::at(
        TestHarness::today().and_hms_opt(8, 0, 0).unwrap(),
    ));
    let manager = AppointmentManager::new(store.clone(), store, clock, &ShowingConfig::default());

    let err = manager
        .create_appointment(TestHarness::booking(10, "14:00", 45))
        .await
        .unwrap_err();
    assert!(matches!(err, ShowingError::Validation(ref m) if m.contains("duration_minutes")));
}

#[tokio::test(start_paused = true)]
async fn stalled_directory_surfaces_a_retryable_timeout() {
    let clock = Arc::new(FixedClock::at(
        TestHarness::today().and_hms_opt(8, 0, 0).unwrap(),
    ));
    let mut config = ShowingConfig::default();
    config.scheduling.store_timeout_ms = 200;
    let manager = AppointmentManager::new(
        Arc::new(UnreachableStore),
        Arc::new(StallingDirectory),
        clock,
        &config,
    );

    let err = manager
        .create_appointment(TestHarness::booking(10, "14:00", 60))
        .await
        .unwrap_err();
    assert!(matches!(err, ShowingError::Timeout { duration } if duration == Duration::from_millis(200)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn full_lifecycle_leaves_an_audit_trail() {
    let h = TestHarness::builder().with_realtors(2).build().await.unwrap();
    let a = h
        .manager
        .create_appointment(TestHarness::booking(10, "10:00", 30))
        .await
        .unwrap();
    let realtor = a.realtor_id.unwrap();

    let confirmed = h.manager.accept_appointment(a.id, realtor).await.unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
    assert!(confirmed.confirmed_at.is_some());

    let started = h.manager.start_appointment(a.id, realtor).await.unwrap();
    assert_eq!(started.status, AppointmentStatus::InProgress);

    let completed = h.manager.complete_appointment(a.id, realtor).await.unwrap();
    assert_eq!(completed.status, AppointmentStatus::Completed);
    assert!(completed.completed_at.is_some());

    let logs = h.manager.appointment_logs(a.id).await.unwrap();
    assert_eq!(logs.len(), 4);
    assert_eq!(logs[0].old_status, None);
    assert_eq!(logs[0].operator_type, OperatorType::Customer);
    assert!(logs[1..].iter().all(|l| l.operator_type == OperatorType::Realtor));
    assert_eq!(logs[3].new_status, AppointmentStatus::Completed);
}

#[tokio::test]
async fn invalid_transitions_leave_status_unchanged() {
    let h = TestHarness::builder().with_realtors(1).build().await.unwrap();
    let a = h
        .manager
        .create_appointment(TestHarness::booking(10, "10:00", 30))
        .await
        .unwrap();

    let err = h.manager.start_appointment(a.id, 1).await.unwrap_err();
    assert!(matches!(
        err,
        ShowingError::InvalidTransition {
            current: AppointmentStatus::Pending,
            ..
        }
    ));
    let err = h.manager.complete_appointment(a.id, 1).await.unwrap_err();
    assert!(matches!(err, ShowingError::InvalidTransition { .. }));

    h.manager.accept_appointment(a.id, 1).await.unwrap();
    h.manager.start_appointment(a.id, 1).await.unwrap();
    let err = h
        .manager
        .cancel_appointment(a.id, Operator::customer(10), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ShowingError::InvalidTransition {
            current: AppointmentStatus::InProgress,
            ..
        }
    ));

    let stored = h.manager.get_appointment(a.id).await.unwrap();
    assert_eq!(stored.status, AppointmentStatus::InProgress);
    assert_eq!(h.manager.appointment_logs(a.id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn accept_by_an_unknown_or_busy_agent_is_rejected() {
    let h = TestHarness::builder()
        .with_realtors(1)
        .with_inactive_realtor(9)
        .build()
        .await
        .unwrap();
    let bound = h
        .manager
        .create_appointment(TestHarness::booking(10, "14:00", 60))
        .await
        .unwrap();
    let waiting = h
        .manager
        .create_appointment(TestHarness::booking(11, "14:00", 60))
        .await
        .unwrap();
    assert_eq!(bound.realtor_id, Some(1));
    assert_eq!(waiting.queue_position, 1);

    let err = h.manager.accept_appointment(waiting.id, 9).await.unwrap_err();
    assert!(matches!(err, ShowingError::Validation(_)));

    let err = h.manager.accept_appointment(waiting.id, 1).await.unwrap_err();
    assert!(matches!(
        err,
        ShowingError::Conflict {
            subject: ConflictSubject::Realtor,
            ..
        }
    ));

    h.manager
        .cancel_appointment(bound.id, Operator::customer(10), None)
        .await
        .unwrap();
    let accepted = h.manager.accept_appointment(waiting.id, 1).await.unwrap();
    assert_eq!(accepted.realtor_id, Some(1));
    assert_eq!(accepted.queue_position, 0);
    assert!(
        h.manager
            .queued_appointments(STORE_ID, TestHarness::today())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn accepting_a_closed_appointment_reports_its_status_first() {
    let h = TestHarness::builder()
        .with_realtors(1)
        .with_inactive_realtor(9)
        .build()
        .await
        .unwrap();
    let bound = h
        .manager
        .create_appointment(TestHarness::booking(10, "14:00", 60))
        .await
        .unwrap();
    let waiting = h
        .manager
        .create_appointment(TestHarness::booking(11, "14:00", 60))
        .await
        .unwrap();
    h.manager
        .cancel_appointment(waiting.id, Operator::customer(11), None)
        .await
        .unwrap();

    // Agent 1 is also busy at 14:00; the cancelled status still wins.
    let err = h.manager.accept_appointment(waiting.id, 1).await.unwrap_err();
    assert!(matches!(
        err,
        ShowingError::InvalidTransition {
            current: AppointmentStatus::Cancelled,
            ..
        }
    ));

    h.manager.accept_appointment(bound.id, 1).await.unwrap();
    h.manager.start_appointment(bound.id, 1).await.unwrap();
    h.manager.complete_appointment(bound.id, 1).await.unwrap();
    let err = h.manager.accept_appointment(bound.id, 9).await.unwrap_err();
    assert!(matches!(
        err,
        ShowingError::InvalidTransition {
            current: AppointmentStatus::Completed,
            ..
        }
    ));

    let err = h.manager.accept_appointment(bound.id, 1).await.unwrap_err();
    assert!(matches!(err, ShowingError::InvalidTransition { .. }));
    assert_eq!(h.manager.appointment_logs(waiting.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn preferred_agent_rules() {
    let h = TestHarness::builder()
        .with_realtors(2)
        .with_inactive_realtor(3)
        .build()
        .await
        .unwrap();

    let err = h
        .manager
        .create_appointment(with_realtor(TestHarness::booking(10, "10:00", 60), 3))
        .await
        .unwrap_err();
    assert!(matches!(err, ShowingError::Validation(_)));

    let first = h
        .manager
        .create_appointment(with_realtor(TestHarness::booking(10, "10:00", 60), 2))
        .await
        .unwrap();
    assert_eq!(first.realtor_id, Some(2));

    let err = h
        .manager
        .create_appointment(with_realtor(TestHarness::booking(11, "10:30", 30), 2))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ShowingError::Conflict {
            subject: ConflictSubject::Realtor,
            ..
        }
    ));

    let fallback = h
        .manager
        .create_appointment(TestHarness::booking(11, "10:30", 30))
        .await
        .unwrap();
    assert_eq!(fallback.realtor_id, Some(1));
}

#[tokio::test]
async fn customer_conflicts_and_back_to_back_bookings() {
    let h = TestHarness::builder().with_realtors(3).build().await.unwrap();
    h.manager
        .create_appointment(TestHarness::booking(10, "10:00", 60))
        .await
        .unwrap();

    let err = h
        .manager
        .create_appointment(TestHarness::booking(10, "10:30", 30))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ShowingError::Conflict {
            subject: ConflictSubject::Customer,
            ..
        }
    ));

    let next = h
        .manager
        .create_appointment(TestHarness::booking(10, "11:00", 30))
        .await
        .unwrap();
    assert_eq!(next.realtor_id, Some(1), "back-to-back reuses the first agent");
}

#[tokio::test]
async fn store_and_hours_preconditions() {
    let h = TestHarness::builder()
        .with_realtors(1)
        .with_store_hours(hm(9, 0), hm(12, 0))
        .build()
        .await
        .unwrap();

    let err = h
        .manager
        .create_appointment(TestHarness::booking(10, "11:30", 60))
        .await
        .unwrap_err();
    assert!(matches!(err, ShowingError::Validation(ref m) if m.contains("working hours")));

    let err = h
        .manager
        .create_appointment(BookingRequest {
            store_id: 77,
            ..TestHarness::booking(10, "10:00", 30)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ShowingError::Validation(ref m) if m.contains("does not exist")));

    let closed = TestHarness::builder()
        .with_realtors(1)
        .with_inactive_store()
        .build()
        .await
        .unwrap();
    let err = closed
        .manager
        .create_appointment(TestHarness::booking(10, "10:00", 30))
        .await
        .unwrap_err();
    assert!(matches!(err, ShowingError::Validation(ref m) if m.contains("not accepting")));
}

#[tokio::test]
async fn agent_hours_steer_automatic_assignment() {
    let h = TestHarness::builder()
        .with_realtors(2)
        .with_realtor_hours(1, hm(9, 0), hm(12, 0))
        .build()
        .await
        .unwrap();

    let afternoon = h
        .manager
        .create_appointment(TestHarness::booking(10, "15:00", 60))
        .await
        .unwrap();
    assert_eq!(afternoon.realtor_id, Some(2));

    let morning = h
        .manager
        .create_appointment(TestHarness::booking(11, "09:00", 60))
        .await
        .unwrap();
    assert_eq!(morning.realtor_id, Some(1));
}

#[tokio::test]
async fn preferred_agent_must_be_on_shift() {
    let h = TestHarness::builder()
        .with_realtors(2)
        .with_realtor_hours(1, hm(9, 0), hm(12, 0))
        .build()
        .await
        .unwrap();

    let err = h
        .manager
        .create_appointment(with_realtor(TestHarness::booking(10, "15:00", 60), 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ShowingError::Validation(ref m) if m.contains("realtor 1's working hours")));

    let straddling = h
        .manager
        .create_appointment(with_realtor(TestHarness::booking(10, "11:30", 60), 1))
        .await
        .unwrap_err();
    assert!(matches!(straddling, ShowingError::Validation(_)));

    let on_shift = h
        .manager
        .create_appointment(with_realtor(TestHarness::booking(10, "11:00", 60), 1))
        .await
        .unwrap();
    assert_eq!(on_shift.realtor_id, Some(1));

    // Agent 2 has no hours of their own and follows the store.
    let follows_store = h
        .manager
        .create_appointment(with_realtor(TestHarness::booking(11, "15:00", 60), 2))
        .await
        .unwrap();
    assert_eq!(follows_store.realtor_id, Some(2));
}

#[tokio::test]
async fn lookups_are_idempotent() {
    let h = TestHarness::builder().with_realtors(1).build().await.unwrap();
    let a = h
        .manager
        .create_appointment(TestHarness::booking(10, "10:00", 30))
        .await
        .unwrap();

    let first = h.manager.get_appointment_by_code(&a.appointment_code).await.unwrap();
    let second = h
        .manager
        .get_appointment_by_code(&a.appointment_code.to_lowercase())
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first.id, a.id);

    let err = h.manager.get_appointment_by_code("NOPE42").await.unwrap_err();
    assert!(matches!(err, ShowingError::NotFound { .. }));
}

#[tokio::test]
async fn code_collisions_are_retried() {
    let codes = Arc::new(SequenceCodes::new(["AAAAAA", "AAAAAA", "BBBBBB"]));
    let h = TestHarness::builder()
        .with_realtors(2)
        .with_code_source(codes)
        .build()
        .await
        .unwrap();

    let first = h
        .manager
        .create_appointment(TestHarness::booking(10, "10:00", 30))
        .await
        .unwrap();
    let second = h
        .manager
        .create_appointment(TestHarness::booking(11, "10:00", 30))
        .await
        .unwrap();
    assert_eq!(first.appointment_code, "AAAAAA");
    assert_eq!(second.appointment_code, "BBBBBB");

    let err = h
        .manager
        .create_appointment(TestHarness::booking(12, "11:00", 30))
        .await
        .unwrap_err();
    assert!(matches!(err, ShowingError::Internal(_)), "only BBBBBB left: {err}");
}

#[tokio::test]
async fn concurrent_requests_never_double_book_an_agent() {
    let h = Arc::new(TestHarness::builder().with_realtors(1).build().await.unwrap());

    let mut handles = Vec::new();
    for user in 0..6 {
        let h = h.clone();
        handles.push(tokio::spawn(async move {
            h.manager
                .create_appointment(with_realtor(TestHarness::booking(100 + user, "14:00", 60), 1))
                .await
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(ShowingError::Conflict {
                subject: ConflictSubject::Realtor,
                ..
            }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(admitted, 1);
    let day = h
        .manager
        .list_realtor_appointments(1, TestHarness::today())
        .await
        .unwrap();
    assert_eq!(day.len(), 1);
}

#[tokio::test]
async fn queue_stays_contiguous_under_mixed_traffic() {
    let h = TestHarness::builder().build().await.unwrap();

    let mut ids = Vec::new();
    for user in 0..6 {
        let a = h
            .manager
            .create_appointment(TestHarness::booking(10 + user, "13:00", 30))
            .await
            .unwrap();
        ids.push(a.id);
    }
    for &id in [ids[1], ids[4], ids[0]].iter() {
        h.manager
            .cancel_appointment(id, Operator::system(), None)
            .await
            .unwrap();
        let queued = h
            .manager
            .queued_appointments(STORE_ID, TestHarness::today())
            .await
            .unwrap();
        assert!(is_contiguous(&queued), "{queued:?}");
    }
    h.manager.delete_appointment(ids[2]).await.unwrap();

    let queued = h
        .manager
        .queued_appointments(STORE_ID, TestHarness::today())
        .await
        .unwrap();
    let order: Vec<_> = queued.iter().map(|a| a.id).collect();
    assert_eq!(order, vec![ids[3], ids[5]]);
    assert!(is_contiguous(&queued));
    assert_eq!(queued[1].estimated_wait_minutes, 2 * h.config.scheduling.average_service_minutes);

    h.manager
        .queue()
        .recompute_positions(STORE_ID, TestHarness::today())
        .await
        .unwrap();
    let again = h
        .manager
        .queued_appointments(STORE_ID, TestHarness::today())
        .await
        .unwrap();
    assert_eq!(again, queued, "recomputing a contiguous queue changes nothing");

    assert_eq!(
        h.manager
            .queue_count(STORE_ID, TestHarness::today(), hm(13, 0))
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn details_can_be_edited_until_terminal() {
    let h = TestHarness::builder().with_realtors(1).build().await.unwrap();
    let a = h
        .manager
        .create_appointment(TestHarness::booking(10, "10:00", 30))
        .await
        .unwrap();

    h.clock.advance(TimeDelta::minutes(5));
    let edited = h
        .manager
        .update_appointment(
            a.id,
            AppointmentDetails {
                customer_name: " New Name ".into(),
                customer_phone: "555 0101".into(),
                requirements: Some("parking".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.customer_name, "New Name");
    assert_eq!(edited.updated_at, h.clock.now());
    assert_eq!(edited.updated_at - a.created_at, TimeDelta::minutes(5));
    let stored = h.manager.get_appointment(a.id).await.unwrap();
    assert_eq!(stored.updated_at, edited.updated_at);

    let err = h
        .manager
        .update_appointment(
            a.id,
            AppointmentDetails {
                customer_name: "".into(),
                customer_phone: "555 0101".into(),
                requirements: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ShowingError::Validation(_)));

    h.manager
        .cancel_appointment(a.id, Operator::customer(10), None)
        .await
        .unwrap();
    let err = h
        .manager
        .update_appointment(
            a.id,
            AppointmentDetails {
                customer_name: "Late".into(),
                customer_phone: "555 0101".into(),
                requirements: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ShowingError::InvalidTransition { .. }));
}

#[tokio::test]
async fn user_listing_validates_paging() {
    let h = TestHarness::builder().with_realtors(1).build().await.unwrap();
    for start in ["09:00", "10:00", "11:00"] {
        h.manager
            .create_appointment(TestHarness::booking(10, start, 30))
            .await
            .unwrap();
    }

    let page = h.manager.list_user_appointments(10, 1, 2).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].start_time, hm(11, 0), "newest first");
    assert!(h.manager.list_user_appointments(10, 0, 2).await.is_err());
    assert!(h.manager.list_user_appointments(10, 1, 0).await.is_err());
    assert!(h.manager.list_user_appointments(10, 1, 101).await.is_err());
}
