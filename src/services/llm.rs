// src/services/llm.rs
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GeminiConfig;

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("provider rejected credentials ({0})")]
    Unauthorized(StatusCode),
    #[error("rate limited by provider")]
    RateLimited,
    #[error("provider error {status}: {message}")]
    Provider { status: StatusCode, message: String },
    #[error("provider returned no text: {0}")]
    EmptyResponse(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl AnswerError {
    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AnswerError::Timeout | AnswerError::Network(_) | AnswerError::RateLimited => true,
            AnswerError::Provider { status, .. } => status.is_server_error(),
            AnswerError::Unauthorized(_)
            | AnswerError::EmptyResponse(_)
            | AnswerError::InvalidResponse(_) => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AnswerError::Timeout => "timeout",
            AnswerError::Network(_) => "network",
            AnswerError::Unauthorized(_) => "unauthorized",
            AnswerError::RateLimited => "rate_limited",
            AnswerError::Provider { .. } => "provider",
            AnswerError::EmptyResponse(_) => "empty_response",
            AnswerError::InvalidResponse(_) => "invalid_response",
        }
    }
}

impl From<reqwest::Error> for AnswerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AnswerError::Timeout
        } else if e.is_decode() {
            AnswerError::InvalidResponse(e.to_string())
        } else {
            AnswerError::Network(e.to_string())
        }
    }
}

/// Produces an answer for a fully rendered prompt.
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn answer(&self, prompt: &str) -> Result<String, AnswerError>;
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SafetySetting {
    pub category: &'static str,
    pub threshold: &'static str,
}

/// Only dangerous-content blocking is switched off; every other category keeps
/// the provider default.
pub const SAFETY_SETTINGS: &[SafetySetting] = &[SafetySetting {
    category: "HARM_CATEGORY_DANGEROUS_CONTENT",
    threshold: "BLOCK_NONE",
}];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    safety_settings: &'static [SafetySetting],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl AnswerService for GeminiClient {
    #[tracing::instrument(skip(self, prompt), fields(model = %self.model, prompt_chars = prompt.len()))]
    async fn answer(&self, prompt: &str) -> Result<String, AnswerError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            safety_settings: SAFETY_SETTINGS,
        };

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|env| env.error.message)
                .unwrap_or(raw);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    AnswerError::Unauthorized(status)
                }
                StatusCode::TOO_MANY_REQUESTS => AnswerError::RateLimited,
                _ => AnswerError::Provider { status, message },
            });
        }

        let raw = resp.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&raw)
            .map_err(|e| AnswerError::InvalidResponse(e.to_string()))?;

        let Some(candidate) = parsed.candidates.into_iter().next() else {
            let reason = parsed
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(AnswerError::EmptyResponse(reason));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate
                .finish_reason
                .unwrap_or_else(|| "empty candidate".to_string());
            return Err(AnswerError::EmptyResponse(reason));
        }

        tracing::debug!(answer_chars = text.len(), "LLM answer received");
        Ok(text)
    }
}
