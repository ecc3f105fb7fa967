//! Database query functions for the `daily_reviews` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::{DailyReview, StatusCount};

/// Insert or overwrite the review for `(user_id, review_date)`.
///
/// A second call for the same key replaces summary and feedback and bumps
/// `updated_at`; `created_at` keeps the first write's time.
pub async fn upsert_review(
    pool: &PgPool,
    user_id: Uuid,
    review_date: NaiveDate,
    summary: &[StatusCount],
    ai_feedback: &str,
) -> Result<DailyReview> {
    let review = sqlx::query_as::<_, DailyReview>(
        "INSERT INTO daily_reviews (user_id, review_date, summary, ai_feedback) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (user_id, review_date) DO UPDATE \
         SET summary = EXCLUDED.summary, \
             ai_feedback = EXCLUDED.ai_feedback, \
             updated_at = now() \
         RETURNING *",
    )
    .bind(user_id)
    .bind(review_date)
    .bind(Json(summary))
    .bind(ai_feedback)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to upsert review for {review_date}"))?;

    Ok(review)
}

/// Fetch the review for `(user_id, review_date)`, if any.
pub async fn get_review(
    pool: &PgPool,
    user_id: Uuid,
    review_date: NaiveDate,
) -> Result<Option<DailyReview>> {
    let review = sqlx::query_as::<_, DailyReview>(
        "SELECT * FROM daily_reviews WHERE user_id = $1 AND review_date = $2",
    )
    .bind(user_id)
    .bind(review_date)
    .fetch_optional(pool)
    .await
    .context("failed to fetch daily review")?;

    Ok(review)
}

/// Whether a review exists for `(user_id, review_date)`.
pub async fn review_exists(pool: &PgPool, user_id: Uuid, review_date: NaiveDate) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM daily_reviews WHERE user_id = $1 AND review_date = $2)",
    )
    .bind(user_id)
    .bind(review_date)
    .fetch_one(pool)
    .await
    .context("failed to check for daily review")?;

    Ok(exists)
}
