//! Database query functions for the `daily_schedules` table.
//!
//! A row marks that a generated task batch was committed for a user and
//! date. The primary key is the guard against two concurrent generations
//! both persisting.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Claim `(user_id, schedule_date)` inside the caller's transaction.
///
/// Returns `true` when this transaction now owns the claim and `false` when
/// another transaction already committed one. If a concurrent transaction
/// holds an uncommitted claim, Postgres blocks here until it resolves.
pub async fn try_claim_schedule(
    conn: &mut PgConnection,
    user_id: Uuid,
    schedule_date: NaiveDate,
    focus_step_id: Uuid,
) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO daily_schedules (user_id, schedule_date, focus_step_id) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (user_id, schedule_date) DO NOTHING",
    )
    .bind(user_id)
    .bind(schedule_date)
    .bind(focus_step_id)
    .execute(conn)
    .await
    .context("failed to claim daily schedule")?;

    Ok(result.rows_affected() == 1)
}

/// Whether a batch was already committed for `(user_id, schedule_date)`.
pub async fn schedule_claimed(
    pool: &PgPool,
    user_id: Uuid,
    schedule_date: NaiveDate,
) -> Result<bool> {
    let claimed: bool = sqlx::query_scalar(
        "SELECT EXISTS( \
             SELECT 1 FROM daily_schedules WHERE user_id = $1 AND schedule_date = $2 \
         )",
    )
    .bind(user_id)
    .bind(schedule_date)
    .fetch_one(pool)
    .await
    .context("failed to check daily schedule claim")?;

    Ok(claimed)
}
