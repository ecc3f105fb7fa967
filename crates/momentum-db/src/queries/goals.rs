//! Database query functions for the `goals` table.

use anyhow::{Context, Result};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::Goal;

/// Insert a new active goal row.
///
/// Must run in the same transaction as [`deactivate_active_goals`]; the
/// partial unique index rejects a second active goal per user.
pub async fn insert_goal(conn: &mut PgConnection, user_id: Uuid, description: &str) -> Result<Goal> {
    let goal = sqlx::query_as::<_, Goal>(
        "INSERT INTO goals (user_id, description, is_active) \
         VALUES ($1, $2, TRUE) \
         RETURNING *",
    )
    .bind(user_id)
    .bind(description)
    .fetch_one(conn)
    .await
    .context("failed to insert goal")?;

    Ok(goal)
}

/// Mark every active goal of a user inactive. Returns the number of goals
/// deactivated.
pub async fn deactivate_active_goals(conn: &mut PgConnection, user_id: Uuid) -> Result<u64> {
    let result = sqlx::query("UPDATE goals SET is_active = FALSE WHERE user_id = $1 AND is_active")
        .bind(user_id)
        .execute(conn)
        .await
        .context("failed to deactivate active goals")?;

    Ok(result.rows_affected())
}

/// Fetch the active goal of a user, if any.
pub async fn get_active_goal(pool: &PgPool, user_id: Uuid) -> Result<Option<Goal>> {
    let goal = sqlx::query_as::<_, Goal>(
        "SELECT * FROM goals WHERE user_id = $1 AND is_active LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch active goal")?;

    Ok(goal)
}

/// Lock and return the active goal of a user inside a transaction.
///
/// Serializes concurrent step mutations on the same roadmap.
pub async fn lock_active_goal(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<Goal>> {
    let goal = sqlx::query_as::<_, Goal>(
        "SELECT * FROM goals WHERE user_id = $1 AND is_active FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await
    .context("failed to lock active goal")?;

    Ok(goal)
}

/// Lock and return a goal owned by `user_id` inside a transaction.
pub async fn lock_owned_goal(
    conn: &mut PgConnection,
    user_id: Uuid,
    goal_id: Uuid,
) -> Result<Option<Goal>> {
    let goal = sqlx::query_as::<_, Goal>(
        "SELECT * FROM goals WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(goal_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
    .context("failed to lock goal")?;

    Ok(goal)
}

/// Fetch a goal by ID, scoped to its owner.
pub async fn get_owned_goal(pool: &PgPool, user_id: Uuid, goal_id: Uuid) -> Result<Option<Goal>> {
    let goal = sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE id = $1 AND user_id = $2")
        .bind(goal_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch goal")?;

    Ok(goal)
}

/// Replace a goal's description, scoped to its owner.
///
/// Returns the updated goal, or `None` when no goal with that ID belongs to
/// the user.
pub async fn update_goal_description(
    conn: &mut PgConnection,
    user_id: Uuid,
    goal_id: Uuid,
    description: &str,
) -> Result<Option<Goal>> {
    let goal = sqlx::query_as::<_, Goal>(
        "UPDATE goals SET description = $1 \
         WHERE id = $2 AND user_id = $3 \
         RETURNING *",
    )
    .bind(description)
    .bind(goal_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
    .context("failed to update goal description")?;

    Ok(goal)
}
