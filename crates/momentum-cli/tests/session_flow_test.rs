//! Multi-day session flow: create a goal, work through a day, come back the
//! next morning and let the lazy backfill close the previous day.
//!
//! Runs against a real PostgreSQL instance with one temporary database per
//! test.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};

use momentum_core::Engine;
use momentum_core::clock::FixedClock;
use momentum_core::testing::ScriptedGenerator;
use momentum_db::models::{StatusCount, StepStatus, TaskStatus};
use momentum_test_utils::{create_test_db, drop_test_db};
use uuid::Uuid;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn count_of(summary: &[StatusCount], status: TaskStatus) -> i64 {
    summary
        .iter()
        .find(|c| c.status == status)
        .map_or(0, |c| c.count)
}

#[tokio::test]
async fn test_two_day_session_with_backfill() {
    let (pool, db_name) = create_test_db().await;

    let generator = Arc::new(
        ScriptedGenerator::new()
            .with_roadmap(["Learn syntax", "Write a CLI", "Publish a crate"])
            .with_daily_tasks(["Read the book", "Do exercises"])
            .with_feedback("Solid progress."),
    );
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap(),
    ));
    let engine = Engine::new(pool.clone(), generator.clone(), clock.clone());
    let user_id = Uuid::new_v4();

    // Day one.
    let created = engine
        .roadmap()
        .create_goal(user_id, "Become productive in Rust")
        .await
        .expect("create_goal should succeed");
    let first_step = created.steps[0].id;

    let today = engine
        .scheduler()
        .start_day(user_id)
        .await
        .expect("start_day should succeed");
    assert_eq!(today.len(), 2);
    assert!(today.iter().all(|t| t.scheduled_date == day(2)));
    assert!(today.iter().all(|t| t.roadmap_step_id == Some(first_step)));

    engine
        .tasks()
        .update_task_status(user_id, today[0].id, TaskStatus::Completed)
        .await
        .expect("completing a pending task should succeed");
    let evening = Utc.with_ymd_and_hms(2026, 3, 2, 18, 0, 0).unwrap();
    engine
        .tasks()
        .update_task_deadline(user_id, today[1].id, Some(evening))
        .await
        .expect("setting a deadline should succeed");

    // Day two: yesterday has no review, so start_day closes it first.
    clock.advance(Duration::days(1));
    generator.set_daily_tasks(["Build the argument parser", "Add tests", "Write docs"]);

    let today = engine
        .scheduler()
        .start_day(user_id)
        .await
        .expect("start_day should succeed");
    assert_eq!(today.len(), 3);
    assert!(today.iter().all(|t| t.scheduled_date == day(3)));

    let review = engine
        .finalizer()
        .get_review(user_id, day(2))
        .await
        .expect("yesterday should have been finalized");
    assert_eq!(count_of(&review.summary.0, TaskStatus::Completed), 1);
    assert_eq!(count_of(&review.summary.0, TaskStatus::Missed), 1);
    assert_eq!(review.ai_feedback, "Solid progress.");

    let prior = generator.last_prior_tasks();
    assert_eq!(prior.len(), 2, "day two should be planned with day one's history");
    assert!(prior.iter().any(|t| t.status == TaskStatus::Missed));

    // Finishing the focus step moves the next schedule on to step two.
    engine
        .roadmap()
        .update_step_status(user_id, first_step, StepStatus::Done)
        .await
        .expect("step status update should succeed");
    clock.advance(Duration::days(1));

    let today = engine
        .scheduler()
        .start_day(user_id)
        .await
        .expect("start_day should succeed");
    assert!(today.iter().all(|t| t.roadmap_step_id == Some(created.steps[1].id)));

    let review = engine
        .finalizer()
        .get_review(user_id, day(3))
        .await
        .expect("day two should have been finalized");
    assert_eq!(count_of(&review.summary.0, TaskStatus::Pending), 3);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn test_first_session_without_goal_is_empty() {
    let (pool, db_name) = create_test_db().await;

    let generator = Arc::new(ScriptedGenerator::new());
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap(),
    ));
    let engine = Engine::new(pool.clone(), generator.clone(), clock);
    let user_id = Uuid::new_v4();

    let today = engine
        .scheduler()
        .start_day(user_id)
        .await
        .expect("start_day should succeed");
    assert!(today.is_empty());
    assert_eq!(generator.task_calls(), 0);

    // The empty previous day still gets a review row.
    let review = engine
        .finalizer()
        .get_review(user_id, day(1))
        .await
        .expect("backfill should store a review for the previous day");
    assert!(review.summary.0.is_empty());

    pool.close().await;
    drop_test_db(&db_name).await;
}
