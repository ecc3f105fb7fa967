//! Content generation: roadmap steps, daily tasks and review feedback.
//!
//! The engine only talks to the [`ContentGenerator`] trait. The production
//! implementation is [`GeminiGenerator`]; tests use
//! [`crate::testing::ScriptedGenerator`].

pub mod extract;
pub mod gemini;
pub mod prompt;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use momentum_db::models::{StatusCount, Task};

pub use gemini::{GeminiGenerator, GeneratorConfig};

/// A roadmap step proposed by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedStep {
    /// The generator's own numbering. Used only to sort; stored orders are
    /// always renumbered 1..N.
    #[serde(default, alias = "step_order")]
    pub order: i32,
    pub title: String,
}

/// A daily task proposed by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTask {
    pub title: String,
}

/// Errors from a content generator call.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("content generator request failed: {0}")]
    Request(String),

    #[error("content generator timed out after {0:?}")]
    Timeout(Duration),

    /// The output held no JSON that could be parsed. `raw` is the full
    /// generator output, kept for diagnostics.
    #[error("could not parse content generator output: {reason}")]
    Parse { reason: String, raw: String },
}

/// Produces roadmap steps, daily tasks and review feedback.
///
/// Object-safe so the engine can hold an `Arc<dyn ContentGenerator>`.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Break a goal into ordered steps.
    async fn generate_roadmap(
        &self,
        goal_description: &str,
    ) -> Result<Vec<GeneratedStep>, GenerationError>;

    /// Propose today's tasks for the focus step. An empty list is a valid
    /// answer.
    async fn generate_daily_tasks(
        &self,
        goal_description: &str,
        focus_step_title: &str,
        prior_day_tasks: &[Task],
    ) -> Result<Vec<GeneratedTask>, GenerationError>;

    /// Write short feedback for a finished day.
    async fn generate_feedback(
        &self,
        goal_description: &str,
        summary: &[StatusCount],
    ) -> Result<String, GenerationError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn ContentGenerator) {}
};

/// Sort generated steps by their proposed order (stable for ties), drop
/// blank titles, and return the trimmed titles.
pub fn normalize_steps(mut steps: Vec<GeneratedStep>) -> Vec<String> {
    steps.sort_by_key(|s| s.order);
    steps
        .into_iter()
        .map(|s| s.title.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Drop blank task titles and trim the rest.
pub fn normalize_tasks(tasks: Vec<GeneratedTask>) -> Vec<String> {
    tasks
        .into_iter()
        .map(|t| t.title.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_steps_sorts_and_drops_blanks() {
        let steps = vec![
            GeneratedStep { order: 3, title: "Build a CLI".into() },
            GeneratedStep { order: 1, title: " Learn syntax ".into() },
            GeneratedStep { order: 2, title: "   ".into() },
        ];
        assert_eq!(normalize_steps(steps), vec!["Learn syntax", "Build a CLI"]);
    }

    #[test]
    fn step_accepts_step_order_alias() {
        let step: GeneratedStep =
            serde_json::from_str(r#"{"step_order": 2, "title": "Practice"}"#).unwrap();
        assert_eq!(step.order, 2);
    }

    #[test]
    fn normalize_tasks_drops_blanks() {
        let tasks = vec![
            GeneratedTask { title: "Read chapter 1".into() },
            GeneratedTask { title: "".into() },
        ];
        assert_eq!(normalize_tasks(tasks), vec!["Read chapter 1"]);
    }
}
