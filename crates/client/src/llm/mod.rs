//! Recommendation client for a hosted generative model.
//!
//! ### Protocol
//!
//! - **Endpoint**: `{base_url}/models/{model}:generateContent`
//! - **Authentication**: `x-goog-api-key` header.
//! - **Sampling**: temperature 0.4, top-p 0.8, top-k 40.
//! - **Fallback**: without a key, or when the call or the reply is unusable,
//!   recommendations come from [`local_report`]. Callers never see an error.

pub mod error;
pub mod local;
pub mod prompt;

pub use error::LlmError;
pub use local::local_report;
pub use prompt::{build_prompt, parse_reply};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use siteaudit_core::model::{AiRecommendation, AuditRecord};
use siteaudit_core::{AppConfig, Error, Recommender};

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "siteaudit/0.1";

/// Model client configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key; `None` means local recommendations only.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            api_key: config.llm_api_key.clone().filter(|key| !key.is_empty()),
            model: config.llm_model.clone(),
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .map(|p| p.text.as_str())
            .collect()
    }
}

/// [`Recommender`] backed by the model with a deterministic local fallback.
#[derive(Debug, Clone)]
pub struct LlmRecommender {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmRecommender {
    /// # Errors
    ///
    /// Returns `LlmError::Network` if the HTTP client cannot be built.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn has_model(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Ask the model for a recommendation, without fallback.
    pub async fn ask_model(&self, record: &AuditRecord) -> Result<AiRecommendation, LlmError> {
        let api_key = self.config.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let prompt = build_prompt(record);
        let body = GenerateRequest {
            contents: [Content { parts: [Part { text: &prompt }] }],
            generation_config: GenerationConfig { temperature: 0.4, top_p: 0.8, top_k: 40 },
        };
        let url = format!("{}/models/{}:generateContent", self.config.base_url, self.config.model);

        tracing::debug!(model = %self.config.model, url = %record.url, "Requesting recommendations");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(LlmError::AuthError);
        }
        if status == 429 {
            return Err(LlmError::RateLimited);
        }
        if status.is_client_error() || status.is_server_error() {
            return Err(LlmError::HttpError { status: status.as_u16() });
        }

        let bytes = response.bytes().await?;
        let envelope: GenerateResponse = serde_json::from_slice(&bytes).map_err(|e| LlmError::Parse(e.to_string()))?;
        parse_reply(&envelope.text())
    }
}

#[async_trait]
impl Recommender for LlmRecommender {
    async fn generate_report(&self, record: &AuditRecord) -> Result<AiRecommendation, Error> {
        if !self.has_model() {
            return Ok(local_report(record));
        }

        match self.ask_model(record).await {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::warn!(url = %record.url, error = %e, "Model recommendations unavailable; using local generator");
                Ok(local_report(record))
            }
        }
    }
}
