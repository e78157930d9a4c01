//! Provider Fallback Orchestrator
//!
//! Walks an ordered list of model entries (primary provider models first, then
//! the secondary provider) one attempt at a time. The first non-empty response
//! wins and is passed through output repair. Every attempt is described by an
//! [`AttemptRecord`] pulled from a lazy stream, so nothing past the winning
//! entry is ever started.

use crate::config::{FitgenConfig, ProviderConfig};
use crate::error::{AttemptError, GenerationError};
use crate::provider::{
    create_transport, invoke_with_deadline, GenerationOptions, GenerationRequest,
    GenerationTransport, ImagePayload,
};
use crate::repair::repair_json_with_report;
use futures::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// One model of one provider, in fallback order.
#[derive(Clone)]
pub struct ModelEntry {
    pub provider: String,
    pub model: String,
    pub transport: Arc<dyn GenerationTransport>,
}

impl ModelEntry {
    pub fn new(transport: Arc<dyn GenerationTransport>, model: impl Into<String>) -> Self {
        Self {
            provider: transport.provider_name().to_string(),
            model: model.into(),
            transport,
        }
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.provider, self.model)
    }
}

impl std::fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEntry")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .finish()
    }
}

/// Outcome of a single attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    /// Zero-based position in the fallback order.
    pub index: usize,
    pub provider: String,
    pub model: String,
    pub elapsed: Duration,
    pub outcome: Result<String, AttemptError>,
}

/// A repaired structured value and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub value: T,
    pub provider: String,
    pub model: String,
    /// Attempts made, including the successful one.
    pub attempts: usize,
}

struct Winner {
    text: String,
    provider: String,
    model: String,
    attempts: usize,
}

pub struct FallbackOrchestrator {
    entries: Vec<ModelEntry>,
    attempt_timeout: Duration,
    default_options: GenerationOptions,
}

impl FallbackOrchestrator {
    pub fn new(entries: Vec<ModelEntry>, attempt_timeout: Duration) -> Self {
        Self {
            entries,
            attempt_timeout,
            default_options: GenerationOptions::default(),
        }
    }

    pub fn with_default_options(mut self, options: GenerationOptions) -> Self {
        self.default_options = options;
        self
    }

    /// Build the chain from configuration. Providers without a resolvable
    /// API key are skipped; an empty chain is valid and always exhausts.
    pub fn from_config(config: &FitgenConfig) -> Result<Self, GenerationError> {
        let mut entries = Vec::new();
        append_provider(&mut entries, "primary", &config.providers.primary, None)?;
        if let Some(secondary) = &config.providers.secondary {
            append_provider(&mut entries, "secondary", secondary, Some(1))?;
        }

        info!(
            entries = entries.len(),
            chain = %entries.iter().map(ModelEntry::label).collect::<Vec<_>>().join(" -> "),
            "Fallback chain ready"
        );
        Ok(Self::new(entries, config.generation.attempt_timeout())
            .with_default_options(config.generation.options()))
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    pub fn default_options(&self) -> &GenerationOptions {
        &self.default_options
    }

    /// Lazily evaluated attempts in fallback order. Each item is produced only
    /// when pulled, and `then` never runs two attempts concurrently.
    pub fn attempts<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> impl Stream<Item = AttemptRecord> + 'a {
        let budget = self.attempt_timeout;
        stream::iter(self.entries.iter().enumerate()).then(move |(index, entry)| async move {
            debug!(index, provider = %entry.provider, model = %entry.model, "Attempt started");
            let started = Instant::now();
            let outcome = invoke_with_deadline(entry.transport.as_ref(), &entry.model, request, budget)
                .await
                .and_then(|text| {
                    if text.trim().is_empty() {
                        Err(AttemptError::EmptyResponse)
                    } else {
                        Ok(text)
                    }
                });
            AttemptRecord {
                index,
                provider: entry.provider.clone(),
                model: entry.model.clone(),
                elapsed: started.elapsed(),
                outcome,
            }
        })
    }

    async fn first_success(&self, request: &GenerationRequest) -> Result<Winner, GenerationError> {
        let mut attempts = std::pin::pin!(self.attempts(request));
        let mut count = 0usize;
        let mut last_error = None;

        while let Some(record) = attempts.next().await {
            count += 1;
            match record.outcome {
                Ok(text) => {
                    info!(
                        provider = %record.provider,
                        model = %record.model,
                        attempt = count,
                        elapsed_ms = record.elapsed.as_millis() as u64,
                        "Attempt succeeded"
                    );
                    return Ok(Winner {
                        text,
                        provider: record.provider,
                        model: record.model,
                        attempts: count,
                    });
                }
                Err(err) => {
                    warn!(
                        provider = %record.provider,
                        model = %record.model,
                        attempt = count,
                        kind = err.kind(),
                        elapsed_ms = record.elapsed.as_millis() as u64,
                        error = %err,
                        "Attempt failed, falling back"
                    );
                    last_error = Some(err);
                }
            }
        }

        warn!(attempts = count, "All providers exhausted");
        Err(GenerationError::AllProvidersExhausted {
            attempts: count,
            last_error,
        })
    }

    /// Run the chain for an already built request and repair the result.
    pub async fn generate_request(
        &self,
        request: &GenerationRequest,
    ) -> Result<Generated<Value>, GenerationError> {
        let winner = self.first_success(request).await?;
        match repair_json_with_report(&winner.text) {
            Some(report) => Ok(Generated {
                value: report.value,
                provider: winner.provider,
                model: winner.model,
                attempts: winner.attempts,
            }),
            None => {
                warn!(
                    provider = %winner.provider,
                    model = %winner.model,
                    response_chars = winner.text.chars().count(),
                    "Winning response could not be repaired"
                );
                Err(GenerationError::RepairFailed {
                    provider: winner.provider,
                    model: winner.model,
                })
            }
        }
    }

    pub async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<Generated<Value>, GenerationError> {
        self.generate_request(&GenerationRequest::text(prompt, options.clone()))
            .await
    }

    /// Vision variant: the image travels with every attempt.
    pub async fn generate_from_image(
        &self,
        prompt: &str,
        image_bytes: Vec<u8>,
        media_type: &str,
    ) -> Result<Generated<Value>, GenerationError> {
        let request = GenerationRequest::with_image(
            prompt,
            ImagePayload::new(image_bytes, media_type),
            self.default_options.clone(),
        );
        self.generate_request(&request).await
    }

    /// Typed generation. A repaired value that does not fit `T` counts as a
    /// repair failure of the winning entry.
    pub async fn generate_as<T: DeserializeOwned>(
        &self,
        request: &GenerationRequest,
    ) -> Result<Generated<T>, GenerationError> {
        let generated = self.generate_request(request).await?;
        match serde_json::from_value::<T>(generated.value) {
            Ok(value) => Ok(Generated {
                value,
                provider: generated.provider,
                model: generated.model,
                attempts: generated.attempts,
            }),
            Err(e) => {
                warn!(
                    provider = %generated.provider,
                    model = %generated.model,
                    error = %e,
                    "Repaired value has the wrong shape"
                );
                Err(GenerationError::RepairFailed {
                    provider: generated.provider,
                    model: generated.model,
                })
            }
        }
    }
}

fn append_provider(
    entries: &mut Vec<ModelEntry>,
    role: &str,
    provider: &ProviderConfig,
    limit: Option<usize>,
) -> Result<(), GenerationError> {
    let Some(api_key) = provider.resolve_api_key() else {
        info!(role, provider = provider.kind.as_str(), "Provider not configured, skipping");
        return Ok(());
    };
    let transport = create_transport(provider.kind, api_key, provider.base_url.clone())?;
    let take = limit.unwrap_or(provider.models.len());
    for model in provider.models.iter().take(take) {
        entries.push(ModelEntry::new(transport.clone(), model.clone()));
    }
    Ok(())
}
