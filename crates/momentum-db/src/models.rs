use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Status of a roadmap step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Done,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------

/// Status of a task.
///
/// `Completed` and `Missed` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
    Missed,
}

impl TaskStatus {
    /// Whether no further transition out of this status is allowed.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Missed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Missed => "missed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A user's high-level objective.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// An ordered milestone under a goal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoadmapStep {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub step_order: i32,
    pub title: String,
    pub status: StepStatus,
}

/// A dated action item, optionally linked to the roadmap step it was
/// generated for.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub roadmap_step_id: Option<Uuid>,
    pub title: String,
    pub status: TaskStatus,
    pub scheduled_date: NaiveDate,
    pub deadline: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Number of tasks in one status on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StatusCount {
    pub status: TaskStatus,
    pub count: i64,
}

/// The finalized record of one date.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyReview {
    pub user_id: Uuid,
    pub review_date: NaiveDate,
    pub summary: Json<Vec<StatusCount>>,
    pub ai_feedback: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
