use crate::core::Ranker;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the ranking service
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Ranking service returned no content")]
    EmptyResponse,

    #[error("Ranking call timed out after {0:?}")]
    Timeout(Duration),
}

impl RankingError {
    /// Failures that may clear up if the same call is repeated
    pub fn is_transient(&self) -> bool {
        match self {
            RankingError::Timeout(_) => true,
            RankingError::RequestError(e) => e.is_timeout() || e.is_connect(),
            RankingError::ApiError { status, .. } => *status == 429 || (500..600).contains(status),
            RankingError::InvalidResponse(_) | RankingError::EmptyResponse => false,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client for the Mistral API
///
/// Sends the ranking prompt as a single user message and returns the text of
/// the first choice untouched; decoding is the ranking contract's job.
pub struct MistralClient {
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout: Duration,
    client: Client,
}

impl MistralClient {
    pub fn new(
        endpoint: String,
        api_key: String,
        model: String,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, RankingError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            api_key,
            model,
            temperature,
            timeout,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Ranker for MistralClient {
    async fn rank(&self, prompt: &str) -> Result<String, RankingError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        tracing::debug!("Sending ranking prompt to {} ({} bytes)", self.endpoint, prompt.len());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Ranking service returned {}: {}", status, body);
            return Err(RankingError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| RankingError::InvalidResponse(format!("Failed to parse chat response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(RankingError::EmptyResponse)?;

        tracing::debug!("Ranking response: {:?}", content);

        Ok(content)
    }
}

impl MistralClient {
    fn classify(&self, err: reqwest::Error) -> RankingError {
        if err.is_timeout() {
            RankingError::Timeout(self.timeout)
        } else {
            RankingError::RequestError(err)
        }
    }
}
