//! Gemini `generateContent` client

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use super::CompletionModel;
use crate::CloseEscapeError;
use crate::config::GeminiConfig;

/// HTTP client for the Gemini generative language API
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl GeminiClient {
    /// Create a client from configuration. Requires an API key.
    pub fn new(config: &GeminiConfig) -> anyhow::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| CloseEscapeError::config("Gemini API key is missing"))?;

        let mut builder = Client::builder().user_agent(concat!(
            "CloseEscape/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url,
            urlencoding::encode(&self.model)
        )
    }

    async fn send(&self, prompt: &str) -> crate::Result<reqwest::Response> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        self.client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e))
    }
}

#[async_trait]
impl CompletionModel for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> crate::Result<String> {
        let start_time = Instant::now();
        debug!("Sending prompt to Gemini");

        let response = self.send(prompt).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            error!("Gemini request failed with status {}: {}", status, message);
            return Err(CloseEscapeError::upstream(format!("[{status}] {message}")));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| transport_error(&e))?;

        let text = response_text(parsed)?;
        let duration = start_time.elapsed();
        info!(
            "Gemini responded with {} characters in {:.3}s",
            text.len(),
            duration.as_secs_f64()
        );
        if duration.as_secs() > 10 {
            warn!("Slow Gemini response: {:.3}s", duration.as_secs_f64());
        }
        debug!("Raw Gemini response: {}", text);

        Ok(text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

fn transport_error(e: &reqwest::Error) -> CloseEscapeError {
    if e.is_timeout() {
        CloseEscapeError::upstream(format!("Request timed out: {e}"))
    } else {
        CloseEscapeError::upstream(format!("Error fetching from Gemini: {e}"))
    }
}

/// Concatenated text of the first candidate
fn response_text(response: GenerateContentResponse) -> crate::Result<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .map_or_else(
                || "No candidates returned".to_string(),
                |reason| format!("Prompt was blocked due to {reason}"),
            );
        return Err(CloseEscapeError::upstream(reason));
    };

    match candidate.content {
        Some(content) => Ok(content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<String>()),
        None => Err(CloseEscapeError::upstream(format!(
            "Candidate has no content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ))),
    }
}
