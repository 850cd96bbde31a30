//! Language model client
//!
//! Talks to an OpenAI-compatible chat completions endpoint (DeepSeek by
//! default). One call per question; no retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::config::ModelConfig;
use crate::{Result, TravelGuideError};

/// Produces an answer for a system instruction and a user message
#[async_trait]
pub trait AnswerModel: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Chat completions client for the DeepSeek API
pub struct DeepSeekClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl DeepSeekClient {
    /// Create a new client. Fails when the model credential is missing.
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| TravelGuideError::config("DEEPSEEK_API_KEY is not set"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("travelguide/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TravelGuideError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl AnswerModel for DeepSeekClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        debug!(
            "Requesting completion (system {} chars, user {} chars)",
            system.chars().count(),
            user.chars().count()
        );

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Model API request failed: {}", e);
                TravelGuideError::api(format!("Model API request failed: {e}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TravelGuideError::api(format!("Failed to read model response: {e}")))?;

        if !status.is_success() {
            error!("Model API returned {}: {}", status, body);
            return Err(TravelGuideError::api(format!(
                "Model API returned status {status}"
            )));
        }

        let answer = parse_completion(&body)?;
        info!("Received answer ({} chars)", answer.chars().count());
        Ok(answer)
    }
}

/// Extract `choices[0].message.content` from a chat completions response body
pub fn parse_completion(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| TravelGuideError::api(format!("Malformed model response: {e}")))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| TravelGuideError::api("Model response contained no answer"))
}
