//! Generation Transport
//!
//! A transport issues one request to one model of one provider and returns the
//! raw generated text or a classified [`AttemptError`]. Transports know nothing
//! about fallback order or output repair; the orchestrator layers those on top.

use crate::error::{AttemptError, GenerationError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub mod gemini;
pub mod openai;

pub use gemini::GeminiTransport;
pub use openai::OpenAiTransport;

/// Supported provider APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    #[serde(alias = "openai-compatible")]
    OpenAI,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAI => "openai",
        }
    }
}

/// Sampling knobs forwarded to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    /// Ask the provider for a JSON-only response where the API supports it.
    pub json_response: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: Some(0.7),
            max_output_tokens: Some(8192),
            json_response: true,
        }
    }
}

/// Binary image sent alongside a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    /// e.g. "image/jpeg"
    pub media_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
        }
    }

    pub fn base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// One prompt, optionally with an image, plus sampling options.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<ImagePayload>,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>, options: GenerationOptions) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            options,
        }
    }

    pub fn with_image(prompt: impl Into<String>, image: ImagePayload, options: GenerationOptions) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image),
            options,
        }
    }
}

/// A single provider endpoint family.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    /// Issue one request to `model`. Does not retry.
    async fn invoke(&self, model: &str, request: &GenerationRequest) -> Result<String, AttemptError>;

    /// Provider name used in logs and attempt records.
    fn provider_name(&self) -> &str;
}

/// Run one attempt under its own deadline. When the deadline passes, the
/// in-flight request future is dropped, which cancels it.
pub async fn invoke_with_deadline(
    transport: &dyn GenerationTransport,
    model: &str,
    request: &GenerationRequest,
    budget: Duration,
) -> Result<String, AttemptError> {
    match tokio::time::timeout(budget, transport.invoke(model, request)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            debug!(
                provider = transport.provider_name(),
                model,
                budget_ms = budget.as_millis() as u64,
                "Attempt deadline elapsed"
            );
            Err(AttemptError::Timeout(budget))
        }
    }
}

/// Map a non-success HTTP status and body to an attempt failure.
pub fn classify_status(status: u16, body: &str) -> AttemptError {
    let lowered = body.to_lowercase();
    if status == 429 || lowered.contains("resource_exhausted") || lowered.contains("quota") {
        AttemptError::QuotaExceeded(format!("status {}: {}", status, truncate_body(body)))
    } else {
        AttemptError::Service {
            status,
            message: truncate_body(body),
        }
    }
}

/// Map a client-side request failure to an attempt failure.
pub fn map_http_error(error: reqwest::Error) -> AttemptError {
    if let Some(status) = error.status() {
        classify_status(status.as_u16(), &error.to_string())
    } else if error.is_timeout() {
        AttemptError::Timeout(PROVIDER_HTTP_REQUEST_TIMEOUT)
    } else if error.is_connect() {
        AttemptError::Transport(format!("Connection error: {}", error))
    } else {
        AttemptError::Transport(format!("HTTP error: {}", error))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX_BODY_CHARS: usize = 300;
    let trimmed = body.trim();
    if trimmed.chars().count() > MAX_BODY_CHARS {
        let cut: String = trimmed.chars().take(MAX_BODY_CHARS).collect();
        format!("{}...", cut)
    } else {
        trimmed.to_string()
    }
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
// Outer bound only; the per-attempt deadline is normally shorter.
const PROVIDER_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

pub(crate) fn build_provider_http_client() -> Result<Client, GenerationError> {
    Client::builder()
        .connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT)
        .timeout(PROVIDER_HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| GenerationError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Build the transport for a provider kind.
pub fn create_transport(
    kind: ProviderKind,
    api_key: String,
    base_url: Option<String>,
) -> Result<Arc<dyn GenerationTransport>, GenerationError> {
    let transport: Arc<dyn GenerationTransport> = match kind {
        ProviderKind::Gemini => Arc::new(GeminiTransport::new(api_key, base_url)?),
        ProviderKind::OpenAI => Arc::new(OpenAiTransport::new(api_key, base_url)?),
    };
    Ok(transport)
}
