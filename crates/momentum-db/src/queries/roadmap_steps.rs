//! Database query functions for the `roadmap_steps` table.
//!
//! Orders are kept contiguous (1..N per goal). Every multi-row change to
//! `step_order` runs inside a caller-owned transaction; the deferred unique
//! constraint on `(goal_id, step_order)` is checked at commit.

use anyhow::{Context, Result};
use sqlx::postgres::PgExecutor;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{RoadmapStep, StepStatus};

/// Insert one step with an explicit order.
pub async fn insert_step(
    conn: &mut PgConnection,
    goal_id: Uuid,
    step_order: i32,
    title: &str,
) -> Result<RoadmapStep> {
    let step = sqlx::query_as::<_, RoadmapStep>(
        "INSERT INTO roadmap_steps (goal_id, step_order, title, status) \
         VALUES ($1, $2, $3, 'pending') \
         RETURNING *",
    )
    .bind(goal_id)
    .bind(step_order)
    .bind(title)
    .fetch_one(conn)
    .await
    .with_context(|| format!("failed to insert roadmap step {step_order} for goal {goal_id}"))?;

    Ok(step)
}

/// Insert a batch of titles as pending steps numbered `1..=titles.len()`.
///
/// Returns the inserted rows in order.
pub async fn insert_steps(
    conn: &mut PgConnection,
    goal_id: Uuid,
    titles: &[String],
) -> Result<Vec<RoadmapStep>> {
    let orders: Vec<i32> = (1..=titles.len() as i32).collect();
    let mut steps = sqlx::query_as::<_, RoadmapStep>(
        "INSERT INTO roadmap_steps (goal_id, step_order, title, status) \
         SELECT $1, o, t, 'pending' FROM UNNEST($2::int4[], $3::text[]) AS s(o, t) \
         RETURNING *",
    )
    .bind(goal_id)
    .bind(&orders)
    .bind(titles)
    .fetch_all(conn)
    .await
    .with_context(|| format!("failed to insert roadmap steps for goal {goal_id}"))?;

    steps.sort_by_key(|s| s.step_order);
    Ok(steps)
}

/// List the steps of a goal ordered by `step_order`.
///
/// Accepts the pool or an open transaction (`&mut *tx`).
pub async fn list_steps_for_goal<'e>(
    executor: impl PgExecutor<'e>,
    goal_id: Uuid,
) -> Result<Vec<RoadmapStep>> {
    let steps = sqlx::query_as::<_, RoadmapStep>(
        "SELECT * FROM roadmap_steps WHERE goal_id = $1 ORDER BY step_order ASC",
    )
    .bind(goal_id)
    .fetch_all(executor)
    .await
    .context("failed to list roadmap steps")?;

    Ok(steps)
}

/// Fetch a step only if it belongs to the given goal, locking it.
pub async fn lock_step_in_goal(
    conn: &mut PgConnection,
    goal_id: Uuid,
    step_id: Uuid,
) -> Result<Option<RoadmapStep>> {
    let step = sqlx::query_as::<_, RoadmapStep>(
        "SELECT * FROM roadmap_steps WHERE id = $1 AND goal_id = $2 FOR UPDATE",
    )
    .bind(step_id)
    .bind(goal_id)
    .fetch_optional(conn)
    .await
    .context("failed to fetch roadmap step")?;

    Ok(step)
}

/// Highest `step_order` in a goal, or 0 when it has no steps.
pub async fn get_last_order(conn: &mut PgConnection, goal_id: Uuid) -> Result<i32> {
    let last: i32 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(step_order), 0) FROM roadmap_steps WHERE goal_id = $1",
    )
    .bind(goal_id)
    .fetch_one(conn)
    .await
    .context("failed to fetch last step order")?;

    Ok(last)
}

/// The earliest-ordered pending step of a goal (the focus step).
pub async fn get_next_pending_step(pool: &PgPool, goal_id: Uuid) -> Result<Option<RoadmapStep>> {
    let step = sqlx::query_as::<_, RoadmapStep>(
        "SELECT * FROM roadmap_steps \
         WHERE goal_id = $1 AND status = 'pending' \
         ORDER BY step_order ASC \
         LIMIT 1",
    )
    .bind(goal_id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch next pending step")?;

    Ok(step)
}

/// Rename a step. Only touches the row when the step sits under a goal
/// owned by `user_id`. Returns the number of rows affected.
pub async fn update_step_title(
    pool: &PgPool,
    user_id: Uuid,
    step_id: Uuid,
    title: &str,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE roadmap_steps rs SET title = $1 \
         WHERE rs.id = $2 AND EXISTS ( \
             SELECT 1 FROM goals g WHERE g.id = rs.goal_id AND g.user_id = $3 \
         )",
    )
    .bind(title)
    .bind(step_id)
    .bind(user_id)
    .execute(pool)
    .await
    .context("failed to update roadmap step title")?;

    Ok(result.rows_affected())
}

/// Set a step's status. Only touches the row when the step belongs to the
/// user's active goal. Returns the number of rows affected.
pub async fn update_step_status(
    pool: &PgPool,
    user_id: Uuid,
    step_id: Uuid,
    status: StepStatus,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE roadmap_steps SET status = $1 \
         WHERE id = $2 AND goal_id = ( \
             SELECT id FROM goals WHERE user_id = $3 AND is_active \
         )",
    )
    .bind(status)
    .bind(step_id)
    .bind(user_id)
    .execute(pool)
    .await
    .context("failed to update roadmap step status")?;

    Ok(result.rows_affected())
}

/// Delete one step. Returns the number of rows deleted.
pub async fn delete_step(conn: &mut PgConnection, step_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM roadmap_steps WHERE id = $1")
        .bind(step_id)
        .execute(conn)
        .await
        .context("failed to delete roadmap step")?;

    Ok(result.rows_affected())
}

/// Delete every step of a goal. Returns the number of rows deleted.
pub async fn delete_steps_for_goal(conn: &mut PgConnection, goal_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM roadmap_steps WHERE goal_id = $1")
        .bind(goal_id)
        .execute(conn)
        .await
        .context("failed to delete roadmap steps")?;

    Ok(result.rows_affected())
}

/// Close the gap left by deleting the step at `deleted_order`.
pub async fn renumber_after_delete(
    conn: &mut PgConnection,
    goal_id: Uuid,
    deleted_order: i32,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE roadmap_steps SET step_order = step_order - 1 \
         WHERE goal_id = $1 AND step_order > $2",
    )
    .bind(goal_id)
    .bind(deleted_order)
    .execute(conn)
    .await
    .context("failed to renumber roadmap steps")?;

    Ok(result.rows_affected())
}

/// Assign `step_order = position + 1` to each ID, restricted to `goal_id`.
///
/// Returns the total number of rows updated; the caller validates the ID set
/// beforehand.
pub async fn reorder_steps(
    conn: &mut PgConnection,
    goal_id: Uuid,
    ordered_ids: &[Uuid],
) -> Result<u64> {
    let orders: Vec<i32> = (1..=ordered_ids.len() as i32).collect();
    let result = sqlx::query(
        "UPDATE roadmap_steps rs SET step_order = n.o \
         FROM UNNEST($1::uuid[], $2::int4[]) AS n(id, o) \
         WHERE rs.id = n.id AND rs.goal_id = $3",
    )
    .bind(ordered_ids)
    .bind(&orders)
    .bind(goal_id)
    .execute(conn)
    .await
    .context("failed to reorder roadmap steps")?;

    Ok(result.rows_affected())
}
