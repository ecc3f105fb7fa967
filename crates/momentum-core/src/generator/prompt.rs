//! Prompt builders for the content generator.

use momentum_db::models::{StatusCount, Task, TaskStatus};

/// Prompt asking for 3-5 roadmap steps as a JSON array.
pub fn roadmap_prompt(goal_description: &str) -> String {
    format!(
        "As a productivity coach, create a roadmap for this goal: \"{goal_description}\".\n\
         Give 3 to 5 realistic main steps.\n\
         Reply ONLY with a JSON array like this, with no text before or after it:\n\
         [{{\"order\": 1, \"title\": \"Step 1 title\"}}, {{\"order\": 2, \"title\": \"Step 2 title\"}}]"
    )
}

/// Prompt asking for 3-4 concrete tasks for today as a JSON array.
pub fn daily_tasks_prompt(
    goal_description: &str,
    focus_step_title: &str,
    prior_day_tasks: &[Task],
) -> String {
    let prior = prior_day_summary(prior_day_tasks);
    format!(
        "As a productivity coach, create 3-4 tasks for TODAY.\n\
         The user's overall goal: \"{goal_description}\".\n\
         TODAY'S MAIN FOCUS is the roadmap step: \"{focus_step_title}\".\n\
         Context from yesterday: {prior}\n\n\
         Based on today's main focus, give very specific, actionable tasks.\n\
         Reply ONLY with a JSON array like this, with no extra text:\n\
         [{{\"title\": \"Specific task 1\"}}, {{\"title\": \"Specific task 2\"}}]"
    )
}

/// Prompt asking for 2-3 sentences of coaching feedback in plain prose.
pub fn feedback_prompt(goal_description: &str, summary: &[StatusCount]) -> String {
    let narrative = summary_narrative(summary);
    format!(
        "You are a supportive productivity coach. The user's overall goal is: \"{goal_description}\".\n\
         Here is a summary of their performance today: \"{narrative}\"\n\
         Give short feedback (2-3 sentences) that is positive and constructive. \
         If tasks were completed, praise their progress toward the goal. \
         If nothing was completed, encourage them to try again tomorrow without judging.\n\
         Answer as a coach, not as an assistant. Do not use JSON."
    )
}

/// One line describing the previous day's tasks.
pub fn prior_day_summary(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "This is the first day, there is no task history yet.".to_string();
    }

    let items: Vec<String> = tasks
        .iter()
        .map(|t| format!("\"{}\" ({})", t.title, t.status))
        .collect();
    format!("Yesterday's tasks were: {}.", items.join(", "))
}

/// Plain-language narrative of a status summary.
pub fn summary_narrative(summary: &[StatusCount]) -> String {
    let count = |status: TaskStatus| {
        summary
            .iter()
            .find(|c| c.status == status)
            .map_or(0, |c| c.count)
    };
    format!(
        "The user completed {} tasks, missed {} tasks, and still has {} unfinished tasks.",
        count(TaskStatus::Completed),
        count(TaskStatus::Missed),
        count(TaskStatus::Pending),
    )
}
