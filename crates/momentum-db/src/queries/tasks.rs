//! Database query functions for the `tasks` table.
//!
//! Every mutation is scoped by `user_id` and reports the number of rows it
//! touched, so callers can tell "not yours / not there" apart from success.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{StatusCount, Task, TaskStatus};

/// Fields for a task about to be inserted.
#[derive(Debug, Clone)]
pub struct NewTask<'a> {
    pub user_id: Uuid,
    pub roadmap_step_id: Option<Uuid>,
    pub title: &'a str,
    pub scheduled_date: NaiveDate,
    pub deadline: Option<DateTime<Utc>>,
}

/// Insert a pending task. Returns the inserted row.
pub async fn insert_task<'e>(executor: impl PgExecutor<'e>, new: &NewTask<'_>) -> Result<Task> {
    let task = sqlx::query_as::<_, Task>(
        "INSERT INTO tasks (user_id, roadmap_step_id, title, status, scheduled_date, deadline) \
         VALUES ($1, $2, $3, 'pending', $4, $5) \
         RETURNING *",
    )
    .bind(new.user_id)
    .bind(new.roadmap_step_id)
    .bind(new.title)
    .bind(new.scheduled_date)
    .bind(new.deadline)
    .fetch_one(executor)
    .await
    .with_context(|| format!("failed to insert task {:?}", new.title))?;

    Ok(task)
}

/// List a user's tasks scheduled on `date`, in creation order.
pub async fn list_tasks_for_date<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT * FROM tasks \
         WHERE user_id = $1 AND scheduled_date = $2 \
         ORDER BY created_at ASC, id ASC",
    )
    .bind(user_id)
    .bind(date)
    .fetch_all(executor)
    .await
    .context("failed to list tasks for date")?;

    Ok(tasks)
}

/// Fetch a task by ID, scoped to its owner.
pub async fn get_task(pool: &PgPool, user_id: Uuid, task_id: Uuid) -> Result<Option<Task>> {
    let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch task")?;

    Ok(task)
}

/// Atomically move a task from `from` to `to`.
///
/// Optimistic: the WHERE clause includes `status = $from`, so a task that
/// already left `from` is not touched. `completed_at` is set when provided.
/// Returns the number of rows affected (0 = absent, foreign, or status
/// mismatch).
pub async fn transition_task_status(
    pool: &PgPool,
    user_id: Uuid,
    task_id: Uuid,
    from: TaskStatus,
    to: TaskStatus,
    completed_at: Option<DateTime<Utc>>,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE tasks \
         SET status = $1, completed_at = COALESCE($2, completed_at) \
         WHERE id = $3 AND user_id = $4 AND status = $5",
    )
    .bind(to)
    .bind(completed_at)
    .bind(task_id)
    .bind(user_id)
    .bind(from)
    .execute(pool)
    .await
    .context("failed to transition task status")?;

    Ok(result.rows_affected())
}

/// Set or clear a task's deadline. Returns the number of rows affected.
pub async fn update_task_deadline(
    pool: &PgPool,
    user_id: Uuid,
    task_id: Uuid,
    deadline: Option<DateTime<Utc>>,
) -> Result<u64> {
    let result = sqlx::query("UPDATE tasks SET deadline = $1 WHERE id = $2 AND user_id = $3")
        .bind(deadline)
        .bind(task_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("failed to update task deadline")?;

    Ok(result.rows_affected())
}

/// Rename a task. Returns the number of rows affected.
pub async fn update_task_title(
    pool: &PgPool,
    user_id: Uuid,
    task_id: Uuid,
    title: &str,
) -> Result<u64> {
    let result = sqlx::query("UPDATE tasks SET title = $1 WHERE id = $2 AND user_id = $3")
        .bind(title)
        .bind(task_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("failed to update task title")?;

    Ok(result.rows_affected())
}

/// Delete a task. Returns the number of rows deleted.
pub async fn delete_task(pool: &PgPool, user_id: Uuid, task_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("failed to delete task")?;

    Ok(result.rows_affected())
}

/// Mark every pending task on `date` whose deadline is before `now` as
/// missed. Tasks without a deadline are left alone.
///
/// Returns the number of tasks marked.
pub async fn mark_expired_tasks_missed(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE tasks SET status = 'missed' \
         WHERE user_id = $1 AND scheduled_date = $2 \
           AND status = 'pending' AND deadline IS NOT NULL AND deadline < $3",
    )
    .bind(user_id)
    .bind(date)
    .bind(now)
    .execute(pool)
    .await
    .context("failed to mark expired tasks missed")?;

    Ok(result.rows_affected())
}

/// Count a user's tasks on `date` grouped by status, ordered by status name.
/// Statuses with no tasks are omitted.
pub async fn summarize_by_status(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<StatusCount>> {
    let rows = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count \
         FROM tasks \
         WHERE user_id = $1 AND scheduled_date = $2 \
         GROUP BY status \
         ORDER BY status",
    )
    .bind(user_id)
    .bind(date)
    .fetch_all(pool)
    .await
    .context("failed to summarize tasks by status")?;

    Ok(rows)
}
