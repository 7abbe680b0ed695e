//! LLM client: the single point of entry for all chat-completion calls.
//!
//! ARCHITECTURAL RULE: No other module may talk to the completion endpoint
//! directly. Prompts go in, the provider's JSON envelope comes out untouched;
//! turning that envelope into résumé data is the job of `resume::recovery`.
//!
//! One call per operation. There is no retry here: a caller that wants
//! resilience wraps `complete`.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::Config;

pub mod prompts;

const COMPLETIONS_PATH: &str = "/chat/completions";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const TEMPERATURE: f64 = 0.7;
pub const MAX_TOKENS: u32 = 3000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OpenRouter API key is not set")]
    MissingCredential,

    /// Non-2xx reply (`status` set) or a transport failure such as a timeout
    /// or refused connection (`status` is `None`, `body` holds the cause).
    #[error("API request failed: {}", failure_detail(.status, .body))]
    RequestFailed { status: Option<u16>, body: String },

    #[error("API returned a non-JSON body: {0}")]
    InvalidEnvelope(#[from] serde_json::Error),
}

fn failure_detail(status: &Option<u16>, body: &str) -> String {
    match status {
        Some(status) => format!("{status} - {body}"),
        None => body.to_string(),
    }
}

impl LlmError {
    /// A failure that never produced an HTTP status.
    pub fn transport(cause: impl ToString) -> Self {
        LlmError::RequestFailed {
            status: None,
            body: cause.to_string(),
        }
    }
}

/// Everything the client needs to know about the endpoint.
/// Built from `Config` at startup; tests build it directly.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl LlmSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_key: config.openrouter_api_key.clone(),
            model: config.openrouter_model.clone(),
            base_url: config.openrouter_base_url.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), COMPLETIONS_PATH)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Status and raw body of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// The network seam. `HttpTransport` is the real one; tests swap in a fake
/// to observe (or forbid) network activity.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &Value,
    ) -> Result<TransportResponse, LlmError>;
}

/// reqwest-backed transport with the fixed request timeout.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::transport)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &Value,
    ) -> Result<TransportResponse, LlmError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(LlmError::transport)?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(LlmError::transport)?;

        Ok(TransportResponse { status, body })
    }
}

/// The single completion client shared by both résumé operations.
///
/// The API key sits behind a lock so it can be supplied after startup; the
/// credential check runs on every call.
#[derive(Clone)]
pub struct LlmClient {
    transport: Arc<dyn Transport>,
    api_key: Arc<RwLock<Option<String>>>,
    model: String,
    endpoint: String,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let transport = HttpTransport::new(REQUEST_TIMEOUT)?;
        Ok(Self::with_transport(settings, Arc::new(transport)))
    }

    pub fn with_transport(settings: LlmSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: settings.endpoint(),
            transport,
            api_key: Arc::new(RwLock::new(normalize_key(settings.api_key))),
            model: settings.model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn has_credential(&self) -> bool {
        self.api_key.read().await.is_some()
    }

    /// Replaces the API key. Blank keys clear it.
    pub async fn set_api_key(&self, api_key: Option<String>) {
        *self.api_key.write().await = normalize_key(api_key);
    }

    /// Sends one prompt and returns the provider's JSON envelope as-is.
    ///
    /// Fails with `MissingCredential` before any network I/O when no key is set.
    pub async fn complete(&self, prompt: &str) -> Result<Value, LlmError> {
        let api_key = self
            .api_key
            .read()
            .await
            .clone()
            .ok_or(LlmError::MissingCredential)?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::RESUME_WRITER_SYSTEM,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let body = serde_json::to_value(&request)?;

        info!("Making completion request using model: {}", self.model);
        let response = self
            .transport
            .post_json(&self.endpoint, &api_key, &body)
            .await
            .inspect_err(|e| warn!("Completion request did not complete: {e}"))?;

        if !(200..300).contains(&response.status) {
            warn!(
                "Completion API returned {}: {}",
                response.status, response.body
            );
            return Err(LlmError::RequestFailed {
                status: Some(response.status),
                body: response.body,
            });
        }

        let envelope: Value = serde_json::from_str(&response.body)?;

        if let Some(usage) = envelope.get("usage") {
            debug!(
                "Completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage["prompt_tokens"], usage["completion_tokens"]
            );
        }

        Ok(envelope)
    }
}

fn normalize_key(api_key: Option<String>) -> Option<String> {
    api_key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}
