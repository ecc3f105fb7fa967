//! Deterministic content generator for tests.
//!
//! [`ScriptedGenerator`] returns canned roadmap steps, daily tasks and
//! feedback, counts calls, and can be switched to fail.
//!
//! ```rust,ignore
//! let generator = Arc::new(
//!     ScriptedGenerator::new()
//!         .with_roadmap(["Learn syntax", "Build a CLI"])
//!         .with_daily_tasks(["Read chapter 1"]),
//! );
//! let engine = Engine::new(pool, generator.clone(), clock);
//! assert_eq!(generator.roadmap_calls(), 0);
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use momentum_db::models::{StatusCount, Task};

use crate::generator::{ContentGenerator, GeneratedStep, GeneratedTask, GenerationError};

#[derive(Debug, Default)]
struct Script {
    roadmap: Vec<GeneratedStep>,
    daily_tasks: Vec<String>,
    feedback: String,
    task_delay: Option<Duration>,
    last_prior_tasks: Vec<Task>,
    last_feedback_goal: Option<String>,
}

/// In-memory [`ContentGenerator`] with scripted output.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    script: Mutex<Script>,
    fail_roadmap: AtomicBool,
    fail_tasks: AtomicBool,
    fail_feedback: AtomicBool,
    roadmap_calls: AtomicUsize,
    task_calls: AtomicUsize,
    feedback_calls: AtomicUsize,
}

impl ScriptedGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Roadmap steps to return, numbered 1..N in the given order.
    #[must_use]
    pub fn with_roadmap<I, S>(self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_roadmap(titles);
        self
    }

    /// Daily task titles to return.
    #[must_use]
    pub fn with_daily_tasks<I, S>(self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_daily_tasks(titles);
        self
    }

    /// Feedback text to return.
    #[must_use]
    pub fn with_feedback(self, feedback: &str) -> Self {
        self.set_feedback(feedback);
        self
    }

    /// Sleep this long inside every daily-task call.
    #[must_use]
    pub fn with_task_delay(self, delay: Duration) -> Self {
        self.lock().task_delay = Some(delay);
        self
    }

    pub fn set_roadmap<I, S>(&self, titles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().roadmap = titles
            .into_iter()
            .zip(1..)
            .map(|(title, order)| GeneratedStep {
                order,
                title: title.into(),
            })
            .collect();
    }

    /// Roadmap steps returned verbatim, including their order field.
    pub fn set_raw_roadmap(&self, steps: Vec<GeneratedStep>) {
        self.lock().roadmap = steps;
    }

    pub fn set_daily_tasks<I, S>(&self, titles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().daily_tasks = titles.into_iter().map(Into::into).collect();
    }

    pub fn set_feedback(&self, feedback: &str) {
        self.lock().feedback = feedback.to_string();
    }

    pub fn fail_roadmap(&self, fail: bool) {
        self.fail_roadmap.store(fail, Ordering::SeqCst);
    }

    pub fn fail_tasks(&self, fail: bool) {
        self.fail_tasks.store(fail, Ordering::SeqCst);
    }

    pub fn fail_feedback(&self, fail: bool) {
        self.fail_feedback.store(fail, Ordering::SeqCst);
    }

    pub fn roadmap_calls(&self) -> usize {
        self.roadmap_calls.load(Ordering::SeqCst)
    }

    pub fn task_calls(&self) -> usize {
        self.task_calls.load(Ordering::SeqCst)
    }

    pub fn feedback_calls(&self) -> usize {
        self.feedback_calls.load(Ordering::SeqCst)
    }

    /// Prior-day tasks passed to the most recent daily-task call.
    pub fn last_prior_tasks(&self) -> Vec<Task> {
        self.lock().last_prior_tasks.clone()
    }

    /// Goal description passed to the most recent feedback call.
    pub fn last_feedback_goal(&self) -> Option<String> {
        self.lock().last_feedback_goal.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn scripted_failure() -> GenerationError {
    GenerationError::Request("scripted failure".to_string())
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate_roadmap(
        &self,
        _goal_description: &str,
    ) -> Result<Vec<GeneratedStep>, GenerationError> {
        self.roadmap_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_roadmap.load(Ordering::SeqCst) {
            return Err(scripted_failure());
        }
        Ok(self.lock().roadmap.clone())
    }

    async fn generate_daily_tasks(
        &self,
        _goal_description: &str,
        _focus_step_title: &str,
        prior_day_tasks: &[Task],
    ) -> Result<Vec<GeneratedTask>, GenerationError> {
        self.task_calls.fetch_add(1, Ordering::SeqCst);
        let (titles, delay) = {
            let mut script = self.lock();
            script.last_prior_tasks = prior_day_tasks.to_vec();
            (script.daily_tasks.clone(), script.task_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_tasks.load(Ordering::SeqCst) {
            return Err(scripted_failure());
        }
        Ok(titles
            .into_iter()
            .map(|title| GeneratedTask { title })
            .collect())
    }

    async fn generate_feedback(
        &self,
        goal_description: &str,
        _summary: &[StatusCount],
    ) -> Result<String, GenerationError> {
        self.feedback_calls.fetch_add(1, Ordering::SeqCst);
        let feedback = {
            let mut script = self.lock();
            script.last_feedback_goal = Some(goal_description.to_string());
            script.feedback.clone()
        };
        if self.fail_feedback.load(Ordering::SeqCst) {
            return Err(scripted_failure());
        }
        Ok(feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_scripted_roadmap_numbered_in_order() {
        let generator = ScriptedGenerator::new().with_roadmap(["a", "b"]);
        let steps = generator.generate_roadmap("goal").await.unwrap();
        assert_eq!(steps[0], GeneratedStep { order: 1, title: "a".into() });
        assert_eq!(steps[1], GeneratedStep { order: 2, title: "b".into() });
        assert_eq!(generator.roadmap_calls(), 1);
    }

    #[tokio::test]
    async fn failure_toggle_applies_and_still_counts() {
        let generator = ScriptedGenerator::new().with_daily_tasks(["x"]);
        generator.fail_tasks(true);
        assert!(generator.generate_daily_tasks("g", "s", &[]).await.is_err());
        generator.fail_tasks(false);
        assert_eq!(generator.generate_daily_tasks("g", "s", &[]).await.unwrap().len(), 1);
        assert_eq!(generator.task_calls(), 2);
    }

    #[tokio::test]
    async fn records_feedback_goal() {
        let generator = ScriptedGenerator::new().with_feedback("nice");
        assert_eq!(generator.generate_feedback("run a 10k", &[]).await.unwrap(), "nice");
        assert_eq!(generator.last_feedback_goal().as_deref(), Some("run a 10k"));
    }
}
