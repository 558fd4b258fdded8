//! REST key/value client for the distributed cache tier.
//!
//! ### Protocol
//!
//! - **Endpoint**: the configured REST URL; each command is a `POST` of a
//!   JSON array such as `["SET", key, value]`.
//! - **Authentication**: `Authorization: Bearer <token>`.
//! - **Replies**: `{"result": ...}` on success, `{"error": "..."}` otherwise.
//! - **Retries**: transient failures (network, timeout, 5xx) are retried once.

pub mod error;

pub use error::KvError;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use serde_json::{Value, json};
use siteaudit_core::{AppConfig, DistributedCache, Error};

/// Attempts per command, first try included.
const ATTEMPTS: usize = 2;

/// Pause before a retry.
const RETRY_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

/// Decode one command reply.
fn parse_reply(body: &[u8]) -> Result<Value, KvError> {
    let reply: Reply = serde_json::from_slice(body).map_err(|e| KvError::Parse(e.to_string()))?;
    match reply.error {
        Some(message) => Err(KvError::Command(message)),
        None => Ok(reply.result),
    }
}

/// [`DistributedCache`] over a REST-fronted key/value store.
#[derive(Debug, Clone)]
pub struct RestKvCache {
    http: reqwest::Client,
    url: String,
    token: String,
}

impl RestKvCache {
    /// # Errors
    ///
    /// Returns `KvError::Network` if the HTTP client cannot be built.
    pub fn new(url: &str, token: &str, timeout: Duration) -> Result<Self, KvError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url: url.trim_end_matches('/').to_string(), token: token.to_string() })
    }

    /// Client for the configured store, or `None` when url and token are not both set.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, KvError> {
        match config.kv_credentials() {
            Some((url, token)) => Self::new(url, token, config.timeout()).map(Some),
            None => Ok(None),
        }
    }

    async fn send(&self, command: &Value) -> Result<Value, KvError> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/json")
            .json(command)
            .send()
            .await?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(KvError::AuthError);
        }

        let bytes = response.bytes().await?;
        if status.is_server_error() {
            return Err(KvError::HttpError { status: status.as_u16() });
        }
        if status.is_client_error() {
            // Command errors come back as 400 with an error body.
            return match parse_reply(&bytes) {
                Err(e @ KvError::Command(_)) => Err(e),
                _ => Err(KvError::HttpError { status: status.as_u16() }),
            };
        }
        parse_reply(&bytes)
    }

    async fn command(&self, command: Value) -> Result<Value, KvError> {
        let mut attempt = 1;
        loop {
            match self.send(&command).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < ATTEMPTS => {
                    tracing::debug!(error = %e, attempt, "Retrying KV command");
                    attempt += 1;
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl DistributedCache for RestKvCache {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        match self.command(json!(["GET", key])).await? {
            Value::Null => Ok(None),
            Value::String(value) => Ok(Some(value)),
            other => Ok(Some(other.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.command(json!(["SET", key, value])).await?;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), Error> {
        self.command(json!(["EXPIRE", key, ttl_secs])).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.command(json!(["DEL", key])).await?;
        Ok(())
    }
}
