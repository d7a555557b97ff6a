use super::common::*;
use std::sync::Arc;

use crate::error::ServiceError;
use crate::notifications::{NotificationCategory, NotificationRequest, NotificationRunner};
use crate::store::{NotificationLedger, RepositoryError};
use crate::testing::date;

fn request(category: NotificationCategory, force: bool, now: chrono::NaiveDateTime) -> NotificationRequest {
    NotificationRequest {
        category,
        days: 30,
        force,
        now,
    }
}

#[test]
fn first_run_executes_every_due_category_and_records_it() {
    let scenario = scenario();
    let sink = Arc::new(MemorySink::default());
    let runner = NotificationRunner::new(scenario.store.clone(), sink.clone());
    let now = at(today(), 10, 5);

    let report = runner
        .run(&request(NotificationCategory::All, false, now))
        .expect("run succeeds");

    assert!(report.ran(NotificationCategory::Expiry));
    assert!(report.ran(NotificationCategory::Compliance));
    assert!(report.ran(NotificationCategory::Digest));
    assert!(report.skipped.is_empty());
    assert_eq!(report.delivered, 2 + 1 + 1);
    assert!(report.is_success());
    assert_eq!(sink.events().len(), 4);

    for category in NotificationCategory::SCHEDULED {
        assert_eq!(
            scenario.store.last_notification_run(category).unwrap(),
            Some(now)
        );
    }
}

#[test]
fn rerun_within_the_same_slot_is_skipped() {
    let scenario = scenario();
    let sink = Arc::new(MemorySink::default());
    let runner = NotificationRunner::new(scenario.store.clone(), sink.clone());

    runner
        .run(&request(NotificationCategory::All, false, at(today(), 10, 5)))
        .expect("first run succeeds");
    let report = runner
        .run(&request(NotificationCategory::All, false, at(today(), 10, 30)))
        .expect("second run succeeds");

    assert_eq!(report.skipped, NotificationCategory::SCHEDULED.to_vec());
    assert!(!report.ran(NotificationCategory::All));
    assert_eq!(sink.events().len(), 4);
}

#[test]
fn next_day_runs_only_categories_with_a_new_slot() {
    let scenario = scenario();
    let sink = Arc::new(MemorySink::default());
    let runner = NotificationRunner::new(scenario.store.clone(), sink);

    runner
        .run(&request(NotificationCategory::All, false, at(today(), 10, 5)))
        .expect("monday run succeeds");
    let report = runner
        .run(&request(NotificationCategory::All, false, at(date(2025, 9, 2), 11, 0)))
        .expect("tuesday run succeeds");

    assert!(report.ran(NotificationCategory::Expiry));
    assert!(report.ran(NotificationCategory::Digest));
    assert_eq!(report.skipped, vec![NotificationCategory::Compliance]);
}

#[test]
fn forced_run_bypasses_the_schedule() {
    let scenario = scenario();
    let sink = Arc::new(MemorySink::default());
    let runner = NotificationRunner::new(scenario.store.clone(), sink.clone());
    // Tuesday afternoon: no compliance slot since Monday, which already ran.
    let now = at(date(2025, 9, 2), 15, 0);
    scenario
        .store
        .record_notification_run(NotificationCategory::Compliance, at(today(), 10, 0))
        .unwrap();

    let skipped = runner
        .run(&request(NotificationCategory::Compliance, false, now))
        .expect("run succeeds");
    assert_eq!(skipped.skipped, vec![NotificationCategory::Compliance]);

    let forced = runner
        .run(&request(NotificationCategory::Compliance, true, now))
        .expect("forced run succeeds");
    assert!(forced.forced);
    assert_eq!(forced.compliance.map(|s| s.reminders_sent), Some(1));
    assert!(forced.expiry.is_none());
}

#[test]
fn delivery_errors_are_tallied_in_the_report() {
    let scenario = scenario();
    let sink = Arc::new(BlockingSink {
        blocked: "budi@example.com".to_string(),
        inner: MemorySink::default(),
    });
    let runner = NotificationRunner::new(scenario.store.clone(), sink);

    let report = runner
        .run(&request(NotificationCategory::Compliance, true, at(today(), 10, 0)))
        .expect("run completes");

    assert_eq!(report.errors, 1);
    assert!(!report.is_success());
}

#[test]
fn store_failures_abort_the_run() {
    let scenario = scenario();
    let runner = NotificationRunner::new(scenario.store.clone(), Arc::new(MemorySink::default()));
    scenario
        .store
        .with_connection(|conn| conn.execute_batch("DROP TABLE training_records;"))
        .expect("table dropped");

    let result = runner.run(&request(NotificationCategory::Expiry, true, at(today(), 9, 0)));
    assert!(matches!(
        result,
        Err(ServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
}
