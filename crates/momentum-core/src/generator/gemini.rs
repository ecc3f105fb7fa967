//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use momentum_db::models::{StatusCount, Task};

use super::{ContentGenerator, GeneratedStep, GeneratedTask, GenerationError, extract, prompt};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the model name.
pub const MODEL_ENV: &str = "MOMENTUM_GENERATOR_MODEL";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`GeminiGenerator`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl GeneratorConfig {
    /// Defaults with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Full URL of the `generateContent` endpoint for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// [`ContentGenerator`] backed by the Gemini REST API.
pub struct GeminiGenerator {
    client: Client,
    config: GeneratorConfig,
}

impl GeminiGenerator {
    /// Build a client with the configured request timeout.
    pub fn new(config: GeneratorConfig) -> anyhow::Result<Self> {
        if config.api_key.trim().is_empty() {
            anyhow::bail!("{API_KEY_ENV} is not set");
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Send one prompt and return the first candidate's text.
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Request(format!("API error ({status}): {body}")));
        }

        let response: GenerateResponse = response.json().await.map_err(|e| self.request_error(e))?;
        let text = response.first_text().ok_or_else(|| {
            GenerationError::Request("response contained no candidate text".to_string())
        })?;

        tracing::debug!(model = %self.config.model, raw = %text, "generator response");
        Ok(text)
    }

    fn request_error(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.config.timeout)
        } else {
            GenerationError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl ContentGenerator for GeminiGenerator {
    async fn generate_roadmap(
        &self,
        goal_description: &str,
    ) -> Result<Vec<GeneratedStep>, GenerationError> {
        let raw = self.complete(&prompt::roadmap_prompt(goal_description)).await?;
        let steps: Vec<GeneratedStep> = extract::extract_list(&raw)?;
        tracing::debug!(count = steps.len(), "extracted roadmap steps");
        Ok(steps)
    }

    async fn generate_daily_tasks(
        &self,
        goal_description: &str,
        focus_step_title: &str,
        prior_day_tasks: &[Task],
    ) -> Result<Vec<GeneratedTask>, GenerationError> {
        let prompt = prompt::daily_tasks_prompt(goal_description, focus_step_title, prior_day_tasks);
        let raw = self.complete(&prompt).await?;
        let tasks: Vec<GeneratedTask> = extract::extract_list(&raw)?;
        tracing::debug!(count = tasks.len(), "extracted daily tasks");
        Ok(tasks)
    }

    async fn generate_feedback(
        &self,
        goal_description: &str,
        summary: &[StatusCount],
    ) -> Result<String, GenerationError> {
        let raw = self
            .complete(&prompt::feedback_prompt(goal_description, summary))
            .await?;
        Ok(raw.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, if it has any.
    fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        if content.parts.is_empty() {
            return None;
        }
        Some(content.parts.iter().map(|p| p.text.as_str()).collect())
    }
}
