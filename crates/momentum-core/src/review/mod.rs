//! Closing out a day: missed tasks, status summary, feedback, review row.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use momentum_db::models::{DailyReview, StatusCount};
use momentum_db::queries::{goals as goal_queries, reviews as review_queries, tasks as task_queries};

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::generator::ContentGenerator;

/// Feedback stored when the generator fails or returns nothing.
pub const FALLBACK_FEEDBACK: &str =
    "There was a small problem generating feedback today, but keep up the spirit for tomorrow!";

/// Goal text used in the feedback prompt when the user has no active goal.
pub const PLACEHOLDER_GOAL: &str = "reaching their goals";

/// Outcome of finalizing one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayReview {
    pub review_date: NaiveDate,
    pub summary: Vec<StatusCount>,
    pub feedback: String,
}

/// Finalizes dates into persisted reviews.
pub struct DayFinalizer<'a> {
    pool: &'a PgPool,
    generator: &'a dyn ContentGenerator,
    clock: &'a dyn Clock,
}

impl<'a> DayFinalizer<'a> {
    pub fn new(pool: &'a PgPool, generator: &'a dyn ContentGenerator, clock: &'a dyn Clock) -> Self {
        Self {
            pool,
            generator,
            clock,
        }
    }

    /// Finalize `date` for the user.
    ///
    /// Pending tasks whose deadline is before the clock's current instant
    /// become missed. The review row is upserted, so finalizing the same date
    /// again overwrites the earlier review. A failure to store the review is
    /// logged and the computed review is still returned.
    pub async fn finalize_day(&self, user_id: Uuid, date: NaiveDate) -> CoreResult<DayReview> {
        let now = self.clock.now();
        let missed = task_queries::mark_expired_tasks_missed(self.pool, user_id, date, now).await?;
        let summary = task_queries::summarize_by_status(self.pool, user_id, date).await?;

        let goal_description = match goal_queries::get_active_goal(self.pool, user_id).await {
            Ok(Some(goal)) => goal.description,
            Ok(None) => PLACEHOLDER_GOAL.to_string(),
            Err(e) => {
                tracing::warn!(%user_id, error = %format!("{e:#}"), "could not load active goal for review");
                PLACEHOLDER_GOAL.to_string()
            }
        };

        let feedback = match self.generator.generate_feedback(&goal_description, &summary).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                tracing::warn!(%user_id, %date, "generator returned blank feedback");
                FALLBACK_FEEDBACK.to_string()
            }
            Err(e) => {
                tracing::warn!(%user_id, %date, error = %e, "feedback generation failed");
                FALLBACK_FEEDBACK.to_string()
            }
        };

        if let Err(e) =
            review_queries::upsert_review(self.pool, user_id, date, &summary, &feedback).await
        {
            tracing::error!(%user_id, %date, error = %format!("{e:#}"), "failed to store daily review");
        }

        tracing::info!(%user_id, %date, missed, "finalized day");
        Ok(DayReview {
            review_date: date,
            summary,
            feedback,
        })
    }

    /// The stored review for `date`.
    pub async fn get_review(&self, user_id: Uuid, date: NaiveDate) -> CoreResult<DailyReview> {
        review_queries::get_review(self.pool, user_id, date)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("review for {date}")))
    }
}
