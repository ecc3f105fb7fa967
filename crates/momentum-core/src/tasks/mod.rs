//! User edits to individual tasks.
//!
//! The only user-driven status change is pending -> completed. It is applied
//! with an optimistic `WHERE status = 'pending'` guard, so a task that was
//! concurrently marked missed stays missed.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use momentum_db::models::{Task, TaskStatus};
use momentum_db::queries::tasks::{self as task_queries, NewTask};

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult, expect_rows, require_text};

/// Manual task creation and edits.
pub struct TaskBook<'a> {
    pool: &'a PgPool,
    clock: &'a dyn Clock,
}

impl<'a> TaskBook<'a> {
    pub fn new(pool: &'a PgPool, clock: &'a dyn Clock) -> Self {
        Self { pool, clock }
    }

    /// Add a pending task for today with no roadmap step.
    pub async fn create_manual_task(
        &self,
        user_id: Uuid,
        title: &str,
        deadline: Option<DateTime<Utc>>,
    ) -> CoreResult<Task> {
        let title = require_text(title, "task title")?;
        let new = NewTask {
            user_id,
            roadmap_step_id: None,
            title,
            scheduled_date: self.clock.today(),
            deadline,
        };
        let task = task_queries::insert_task(self.pool, &new).await?;
        tracing::debug!(%user_id, task_id = %task.id, "created manual task");
        Ok(task)
    }

    /// Move a task to `status`. Only pending -> completed is accepted.
    pub async fn update_task_status(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        status: TaskStatus,
    ) -> CoreResult<()> {
        if status == TaskStatus::Completed {
            let rows = task_queries::transition_task_status(
                self.pool,
                user_id,
                task_id,
                TaskStatus::Pending,
                TaskStatus::Completed,
                Some(self.clock.now()),
            )
            .await?;
            if rows == 1 {
                tracing::debug!(%user_id, %task_id, "task completed");
                return Ok(());
            }
        }

        let task = task_queries::get_task(self.pool, user_id, task_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("task {task_id}")))?;
        if task.status.is_terminal() {
            return Err(CoreError::Validation(format!(
                "task is already {}; its status cannot change",
                task.status
            )));
        }
        Err(CoreError::Validation(format!(
            "cannot move task from {} to {status}",
            task.status
        )))
    }

    /// Set or clear a task's deadline.
    pub async fn update_task_deadline(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        deadline: Option<DateTime<Utc>>,
    ) -> CoreResult<()> {
        let rows = task_queries::update_task_deadline(self.pool, user_id, task_id, deadline).await?;
        expect_rows(rows, || format!("task {task_id}"))
    }

    pub async fn update_task_title(&self, user_id: Uuid, task_id: Uuid, title: &str) -> CoreResult<()> {
        let title = require_text(title, "task title")?;
        let rows = task_queries::update_task_title(self.pool, user_id, task_id, title).await?;
        expect_rows(rows, || format!("task {task_id}"))
    }

    pub async fn delete_task(&self, user_id: Uuid, task_id: Uuid) -> CoreResult<()> {
        let rows = task_queries::delete_task(self.pool, user_id, task_id).await?;
        expect_rows(rows, || format!("task {task_id}"))
    }
}
