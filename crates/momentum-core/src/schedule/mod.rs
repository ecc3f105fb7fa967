//! Per-day task schedules anchored to the roadmap's focus step.
//!
//! A schedule is generated at most once per user and date. Generation runs
//! outside any transaction; the batch is then persisted together with a
//! `daily_schedules` claim row. When two requests race, the second claim
//! insert waits for the first transaction and then finds the claim taken,
//! so the loser discards its batch and returns the winner's tasks.

use anyhow::Context;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use momentum_db::models::Task;
use momentum_db::queries::tasks::NewTask;
use momentum_db::queries::{
    goals as goal_queries, reviews as review_queries, roadmap_steps as step_queries,
    schedules as schedule_queries, tasks as task_queries,
};

use crate::clock::Clock;
use crate::error::CoreResult;
use crate::generator::{ContentGenerator, normalize_tasks};
use crate::review::DayFinalizer;

/// Produces and retrieves daily task lists.
pub struct DailyScheduler<'a> {
    pool: &'a PgPool,
    generator: &'a dyn ContentGenerator,
    clock: &'a dyn Clock,
}

impl<'a> DailyScheduler<'a> {
    pub fn new(pool: &'a PgPool, generator: &'a dyn ContentGenerator, clock: &'a dyn Clock) -> Self {
        Self {
            pool,
            generator,
            clock,
        }
    }

    /// Return the user's tasks for `date`, generating them on first request.
    ///
    /// A date whose batch was already committed is never regenerated, even
    /// after the user deletes every task on it. Returns an empty list
    /// without persisting anything when there is no active goal, no pending
    /// step, or the generator proposes no tasks. Generator errors propagate.
    pub async fn get_or_create_schedule(&self, user_id: Uuid, date: NaiveDate) -> CoreResult<Vec<Task>> {
        let existing = task_queries::list_tasks_for_date(self.pool, user_id, date).await?;
        if !existing.is_empty() {
            return Ok(existing);
        }
        if schedule_queries::schedule_claimed(self.pool, user_id, date).await? {
            tracing::debug!(%user_id, %date, "schedule already generated; tasks were removed");
            return Ok(existing);
        }

        let Some(goal) = goal_queries::get_active_goal(self.pool, user_id).await? else {
            tracing::debug!(%user_id, %date, "no active goal; empty schedule");
            return Ok(Vec::new());
        };
        let Some(focus) = step_queries::get_next_pending_step(self.pool, goal.id).await? else {
            tracing::debug!(%user_id, %date, goal_id = %goal.id, "no pending step; empty schedule");
            return Ok(Vec::new());
        };

        let prior = match date.pred_opt() {
            Some(prev) => task_queries::list_tasks_for_date(self.pool, user_id, prev).await?,
            None => Vec::new(),
        };

        let generated = self
            .generator
            .generate_daily_tasks(&goal.description, &focus.title, &prior)
            .await?;
        let titles = normalize_tasks(generated);
        if titles.is_empty() {
            tracing::info!(%user_id, %date, "generator proposed no tasks; nothing persisted");
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await.context("failed to begin transaction")?;

        let claimed =
            schedule_queries::try_claim_schedule(&mut *tx, user_id, date, focus.id).await?;
        if !claimed {
            tx.rollback().await.context("failed to roll back schedule batch")?;
            tracing::debug!(%user_id, %date, "schedule already claimed; returning stored tasks");
            return Ok(task_queries::list_tasks_for_date(self.pool, user_id, date).await?);
        }

        let mut tasks = Vec::with_capacity(titles.len());
        for title in &titles {
            let new = NewTask {
                user_id,
                roadmap_step_id: Some(focus.id),
                title: title.as_str(),
                scheduled_date: date,
                deadline: None,
            };
            tasks.push(task_queries::insert_task(&mut *tx, &new).await?);
        }

        tx.commit().await.context("failed to commit schedule batch")?;

        tracing::info!(
            %user_id,
            %date,
            focus_step_id = %focus.id,
            tasks = tasks.len(),
            "generated daily schedule"
        );
        Ok(tasks)
    }

    /// Tasks already stored for `date`. Never generates.
    pub async fn get_schedule(&self, user_id: Uuid, date: NaiveDate) -> CoreResult<Vec<Task>> {
        Ok(task_queries::list_tasks_for_date(self.pool, user_id, date).await?)
    }

    /// Session start: close yesterday if it has no review, then return
    /// today's schedule.
    ///
    /// Finalizing yesterday is best-effort; a failure is logged and today's
    /// schedule is still produced.
    pub async fn start_day(&self, user_id: Uuid) -> CoreResult<Vec<Task>> {
        let today = self.clock.today();

        if let Some(yesterday) = today.pred_opt() {
            match review_queries::review_exists(self.pool, user_id, yesterday).await {
                Ok(true) => {}
                Ok(false) => {
                    let finalizer = DayFinalizer::new(self.pool, self.generator, self.clock);
                    if let Err(e) = finalizer.finalize_day(user_id, yesterday).await {
                        tracing::warn!(%user_id, date = %yesterday, error = %e, "backfill finalization failed");
                    }
                }
                Err(e) => {
                    tracing::warn!(%user_id, date = %yesterday, error = %format!("{e:#}"), "could not check for yesterday's review");
                }
            }
        }

        self.get_or_create_schedule(user_id, today).await
    }
}
