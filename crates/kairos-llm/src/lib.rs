//! Claude API integration for Kairos.
//!
//! Turns free-text task descriptions into structured draft tasks. The
//! network call sits behind [`TaskExtractor`]; [`extract_or_fallback`] wraps
//! any extractor so that task creation never fails, degrading to a single
//! title-only task when the service errors or answers with nothing.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use kairos_core::{
    ExtractionRequest, ExtractionResponse, NewTask, fallback_tasks, finalize_drafts,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const EXTRACTION_MAX_TOKENS: u32 = 1024;
const EXTRACTION_TEMPERATURE: f32 = 0.1;

/// LLM client errors.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Something that can structure free text into draft tasks.
pub trait TaskExtractor {
    fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> impl Future<Output = Result<ExtractionResponse, LlmError>> + Send;
}

/// Extracts tasks, degrading to a title-only task on any failure.
///
/// The returned list always holds at least one task.
pub async fn extract_or_fallback<E: TaskExtractor>(
    extractor: &E,
    request: &ExtractionRequest,
) -> Vec<NewTask> {
    match extractor.extract(request).await {
        Ok(response) => {
            let drafts = response.into_drafts();
            tracing::debug!(drafts = drafts.len(), "extraction succeeded");
            finalize_drafts(request, drafts)
        }
        Err(err) => {
            tracing::warn!(error = %err, "task extraction failed, keeping raw text");
            fallback_tasks(&request.text)
        }
    }
}

/// Claude API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client with the given API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();

        // Validate API key
        if api_key.is_empty() {
            return Err(LlmError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(LlmError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }

        // Build HTTP client with timeout
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(LlmError::ClientBuild)?;

        Ok(Self {
            http,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Uses a different model for subsequent requests.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn complete(&self, prompt: String) -> Result<String, LlmError> {
        let request = MessageRequest {
            model: self.model.clone(),
            max_tokens: EXTRACTION_MAX_TOKENS,
            temperature: EXTRACTION_TEMPERATURE,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(&body).unwrap_or_else(|| LlmError::Api {
                message: format!("status {status}: {body}"),
            }));
        }

        let payload: MessageResponse = serde_json::from_str(&body)
            .map_err(|err| LlmError::InvalidResponse(err.to_string()))?;
        extract_text(payload.content)
    }
}

impl TaskExtractor for Client {
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResponse, LlmError> {
        let text = self.complete(build_extraction_prompt(request)).await?;
        tracing::debug!(response = %text, "extraction response");
        parse_extraction(&text)
    }
}

#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
}

fn extract_text(blocks: Vec<ContentBlock>) -> Result<String, LlmError> {
    let mut pieces = Vec::new();
    for block in blocks {
        let ContentBlock::Text { text } = block;
        pieces.push(text);
    }
    if pieces.is_empty() {
        return Err(LlmError::InvalidResponse(
            "missing text content".to_string(),
        ));
    }
    Ok(pieces.join("\n"))
}

fn parse_api_error(body: &str) -> Option<LlmError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| LlmError::Api {
            message: payload.error.message,
        })
}

fn build_extraction_prompt(request: &ExtractionRequest) -> String {
    let mut lines = Vec::new();
    lines.push(
        "You are a task-planning assistant. Extract structured tasks from the user's text."
            .to_string(),
    );
    lines.push(
        "Return strict JSON: {\"tasks\":[{\"taskTitle\":\"...\",\"category\":\"...\",\"priority\":\"...\",\"duration\":\"HH:MM\",\"scheduledFor\":\"H:MM AM - H:MM PM\"}]}"
            .to_string(),
    );
    lines.push("Rules:".to_string());
    lines.push("- One entry per distinct task, in the order they are mentioned.".to_string());
    lines.push(
        "- category is one of Work, Personal, Health, Shopping, Other.".to_string(),
    );
    lines.push("- priority is one of Low, Medium, High.".to_string());
    lines.push(
        "- duration is HH:MM (e.g. 01:30); scheduledFor is a 12-hour range such as 9:00 AM - 10:30 AM."
            .to_string(),
    );
    lines.push("- Read obvious typos by intent (e.g. 5PPM means 5 PM).".to_string());
    if request.auto_assign_time {
        lines.push(format!(
            "- Give every task a scheduledFor. Tasks without a stated time start after {} and follow each other without overlapping.",
            request.now.format("%-I:%M %p")
        ));
    } else {
        lines.push(
            "- Only include category, priority, duration and scheduledFor when the text clearly states them."
                .to_string(),
        );
    }
    lines.push(String::new());
    lines.push(format!(
        "current_time: {}",
        request.now.format("%Y-%m-%d %-I:%M %p")
    ));
    lines.push(format!("text: {}", request.text));
    lines.join("\n")
}

/// Parses the model's reply, tolerating a surrounding Markdown code fence.
fn parse_extraction(text: &str) -> Result<ExtractionResponse, LlmError> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|err| LlmError::InvalidResponse(err.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
