//! Judge — the structured-evaluation capability used by every pipeline stage.
//!
//! ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
//! Stages depend only on `dyn Judge`; the concrete [`LlmJudge`] is constructed
//! once at startup and injected, so tests substitute a scripted stub.
//!
//! Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent
//! drift)

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all judge calls.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;

/// Why a single judge evaluation failed.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Judge returned empty content")]
    EmptyContent,

    #[error("Judge output did not match the requested schema: {0}")]
    Schema(#[from] serde_json::Error),
}

/// The evaluation capability consumed by the pipeline stages.
///
/// `evaluate` returns the judge's raw JSON value; use [`evaluate_as`] to
/// decode into a concrete result schema. Stateless between calls — no
/// conversation state is carried.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn evaluate(&self, system: &str, prompt: &str) -> Result<Value, EvaluationError>;
}

/// Evaluates a prompt and decodes the judge's JSON into `T`.
pub async fn evaluate_as<T: DeserializeOwned>(
    judge: &dyn Judge,
    system: &str,
    prompt: &str,
) -> Result<T, EvaluationError> {
    let value = judge.evaluate(system, prompt).await?;
    serde_json::from_value(value).map_err(EvaluationError::Schema)
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic Messages API implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl ApiResponse {
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Judge backed by the Anthropic Messages API.
/// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
#[derive(Clone)]
pub struct LlmJudge {
    client: Client,
    api_key: String,
}

impl LlmJudge {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    async fn call(&self, system: &str, prompt: &str) -> Result<ApiResponse, EvaluationError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<EvaluationError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "judge call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EvaluationError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("judge API returned {}: {}", status, body);
                last_error = Some(EvaluationError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(EvaluationError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let api_response: ApiResponse = response.json().await?;

            debug!(
                "judge call succeeded: input_tokens={}, output_tokens={}",
                api_response.usage.input_tokens, api_response.usage.output_tokens
            );

            return Ok(api_response);
        }

        Err(last_error.unwrap_or(EvaluationError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl Judge for LlmJudge {
    async fn evaluate(&self, system: &str, prompt: &str) -> Result<Value, EvaluationError> {
        let response = self.call(system, prompt).await?;
        let text = response.text().ok_or(EvaluationError::EmptyContent)?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(text);

        serde_json::from_str(text).map_err(EvaluationError::Schema)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from judge output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
