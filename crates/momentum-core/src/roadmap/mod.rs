//! Goals and their ordered roadmap steps.
//!
//! Step orders are contiguous (1..N) per goal at rest. Every operation that
//! touches more than one row runs in a single transaction, and a goal row is
//! locked before its steps are renumbered so concurrent edits serialize.

use std::collections::HashSet;

use anyhow::Context;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use momentum_db::models::{Goal, RoadmapStep, StepStatus};
use momentum_db::queries::{goals as goal_queries, roadmap_steps as step_queries};

use crate::error::{CoreError, CoreResult, expect_rows, require_text};
use crate::generator::{ContentGenerator, normalize_steps};

/// A goal together with its steps in order.
#[derive(Debug, Clone, Serialize)]
pub struct GoalWithSteps {
    pub goal: Goal,
    pub steps: Vec<RoadmapStep>,
}

/// Creates and edits goals and roadmap steps for one request.
pub struct RoadmapManager<'a> {
    pool: &'a PgPool,
    generator: &'a dyn ContentGenerator,
}

impl<'a> RoadmapManager<'a> {
    pub fn new(pool: &'a PgPool, generator: &'a dyn ContentGenerator) -> Self {
        Self { pool, generator }
    }

    /// Create a new active goal with a generated roadmap.
    ///
    /// The previous active goal (if any) is deactivated in the same
    /// transaction that inserts the new goal and its steps.
    pub async fn create_goal(&self, user_id: Uuid, description: &str) -> CoreResult<GoalWithSteps> {
        let description = require_text(description, "goal description")?;
        let titles = self.generate_titles(description).await?;

        let mut tx = self.pool.begin().await.context("failed to begin transaction")?;

        let deactivated = goal_queries::deactivate_active_goals(&mut *tx, user_id).await?;
        let goal = goal_queries::insert_goal(&mut *tx, user_id, description).await?;
        let steps = step_queries::insert_steps(&mut *tx, goal.id, &titles).await?;

        tx.commit().await.context("failed to commit goal creation")?;

        tracing::info!(
            %user_id,
            goal_id = %goal.id,
            steps = steps.len(),
            deactivated,
            "created goal"
        );
        Ok(GoalWithSteps { goal, steps })
    }

    /// Replace a goal's description and regenerate its roadmap.
    ///
    /// The new steps are generated before any write. An empty roadmap leaves
    /// the goal and its old steps untouched.
    pub async fn update_goal(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        description: &str,
    ) -> CoreResult<GoalWithSteps> {
        let description = require_text(description, "goal description")?;
        let titles = self.generate_titles(description).await?;

        let mut tx = self.pool.begin().await.context("failed to begin transaction")?;

        let goal = goal_queries::update_goal_description(&mut *tx, user_id, goal_id, description)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("goal {goal_id}")))?;
        let removed = step_queries::delete_steps_for_goal(&mut *tx, goal.id).await?;
        let steps = step_queries::insert_steps(&mut *tx, goal.id, &titles).await?;

        tx.commit().await.context("failed to commit goal update")?;

        tracing::info!(%user_id, %goal_id, removed, steps = steps.len(), "regenerated roadmap");
        Ok(GoalWithSteps { goal, steps })
    }

    /// The user's active goal and its steps, if there is one.
    pub async fn get_active_goal(&self, user_id: Uuid) -> CoreResult<Option<GoalWithSteps>> {
        let Some(goal) = goal_queries::get_active_goal(self.pool, user_id).await? else {
            return Ok(None);
        };
        let steps = step_queries::list_steps_for_goal(self.pool, goal.id).await?;
        Ok(Some(GoalWithSteps { goal, steps }))
    }

    /// Steps of a goal owned by the user, ordered by `step_order`.
    pub async fn get_roadmap_steps(&self, user_id: Uuid, goal_id: Uuid) -> CoreResult<Vec<RoadmapStep>> {
        goal_queries::get_owned_goal(self.pool, user_id, goal_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("goal {goal_id}")))?;
        Ok(step_queries::list_steps_for_goal(self.pool, goal_id).await?)
    }

    /// Append a pending step after the goal's last step.
    pub async fn add_step(&self, user_id: Uuid, goal_id: Uuid, title: &str) -> CoreResult<RoadmapStep> {
        let title = require_text(title, "step title")?;

        let mut tx = self.pool.begin().await.context("failed to begin transaction")?;

        goal_queries::lock_owned_goal(&mut *tx, user_id, goal_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("goal {goal_id}")))?;
        let last = step_queries::get_last_order(&mut *tx, goal_id).await?;
        let step = step_queries::insert_step(&mut *tx, goal_id, last + 1, title).await?;

        tx.commit().await.context("failed to commit step append")?;

        tracing::debug!(%user_id, %goal_id, step_id = %step.id, order = step.step_order, "appended step");
        Ok(step)
    }

    /// Rename a step under a goal owned by the user.
    pub async fn update_step_title(&self, user_id: Uuid, step_id: Uuid, title: &str) -> CoreResult<()> {
        let title = require_text(title, "step title")?;
        let rows = step_queries::update_step_title(self.pool, user_id, step_id, title).await?;
        expect_rows(rows, || format!("roadmap step {step_id}"))
    }

    /// Set the status of a step in the user's active goal.
    pub async fn update_step_status(
        &self,
        user_id: Uuid,
        step_id: Uuid,
        status: StepStatus,
    ) -> CoreResult<()> {
        let rows = step_queries::update_step_status(self.pool, user_id, step_id, status).await?;
        expect_rows(rows, || format!("roadmap step {step_id}"))
    }

    /// Delete a step of the active goal and close the gap in the ordering.
    pub async fn delete_step(&self, user_id: Uuid, step_id: Uuid) -> CoreResult<()> {
        let mut tx = self.pool.begin().await.context("failed to begin transaction")?;

        let not_found = || CoreError::NotFound(format!("roadmap step {step_id}"));
        let goal = goal_queries::lock_active_goal(&mut *tx, user_id)
            .await?
            .ok_or_else(not_found)?;
        let step = step_queries::lock_step_in_goal(&mut *tx, goal.id, step_id)
            .await?
            .ok_or_else(not_found)?;

        step_queries::delete_step(&mut *tx, step.id).await?;
        let shifted = step_queries::renumber_after_delete(&mut *tx, goal.id, step.step_order).await?;

        tx.commit().await.context("failed to commit step deletion")?;

        tracing::debug!(%user_id, %step_id, order = step.step_order, shifted, "deleted step");
        Ok(())
    }

    /// Reorder the active goal's steps: `ordered_step_ids[i]` gets order
    /// `i + 1`.
    ///
    /// The list must be a permutation of every step in the active goal. An
    /// ID outside the active goal is `Forbidden`; duplicates or a partial list
    /// are a validation error. Nothing changes unless the whole list passes.
    pub async fn reorder_steps(
        &self,
        user_id: Uuid,
        ordered_step_ids: &[Uuid],
    ) -> CoreResult<Vec<RoadmapStep>> {
        let mut tx = self.pool.begin().await.context("failed to begin transaction")?;

        let goal = goal_queries::lock_active_goal(&mut *tx, user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound("active goal".to_string()))?;
        let current = step_queries::list_steps_for_goal(&mut *tx, goal.id).await?;

        validate_permutation(&current, ordered_step_ids)?;

        step_queries::reorder_steps(&mut *tx, goal.id, ordered_step_ids).await?;
        let steps = step_queries::list_steps_for_goal(&mut *tx, goal.id).await?;

        tx.commit().await.context("failed to commit step reorder")?;

        tracing::debug!(%user_id, goal_id = %goal.id, steps = steps.len(), "reordered steps");
        Ok(steps)
    }

    async fn generate_titles(&self, description: &str) -> CoreResult<Vec<String>> {
        let generated = self.generator.generate_roadmap(description).await?;
        let titles = normalize_steps(generated);
        if titles.is_empty() {
            return Err(CoreError::GenerationEmpty("roadmap steps"));
        }
        Ok(titles)
    }
}

/// Check that `ordered` lists every step in `current` exactly once.
fn validate_permutation(current: &[RoadmapStep], ordered: &[Uuid]) -> CoreResult<()> {
    let members: HashSet<Uuid> = current.iter().map(|s| s.id).collect();

    if let Some(foreign) = ordered.iter().find(|id| !members.contains(id)) {
        return Err(CoreError::Forbidden(format!(
            "step {foreign} is not part of the active roadmap"
        )));
    }

    let distinct: HashSet<&Uuid> = ordered.iter().collect();
    if distinct.len() != ordered.len() {
        return Err(CoreError::Validation(
            "reorder list contains duplicate step ids".to_string(),
        ));
    }

    if ordered.len() != current.len() {
        return Err(CoreError::Validation(format!(
            "reorder list must name all {} steps, got {}",
            current.len(),
            ordered.len()
        )));
    }

    Ok(())
}
