//! Error types for plan generation.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single model attempt. Never surfaced to callers on its own:
/// the orchestrator logs it and moves to the next model entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service error {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

impl AttemptError {
    /// Short label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptError::Timeout(_) => "timeout",
            AttemptError::Transport(_) => "transport",
            AttemptError::Service { .. } => "service",
            AttemptError::QuotaExceeded(_) => "quota_exceeded",
            AttemptError::EmptyResponse => "empty_response",
        }
    }
}

/// Terminal outcome of a generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("All providers exhausted after {attempts} attempt(s){}", last_error_suffix(.last_error))]
    AllProvidersExhausted {
        attempts: usize,
        last_error: Option<AttemptError>,
    },

    #[error("Response from {provider}/{model} contained no usable structured output")]
    RepairFailed { provider: String, model: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

fn last_error_suffix(last_error: &Option<AttemptError>) -> String {
    match last_error {
        Some(e) => format!(" (last: {})", e),
        None => String::new(),
    }
}

impl From<config::ConfigError> for GenerationError {
    fn from(err: config::ConfigError) -> Self {
        GenerationError::Config(err.to_string())
    }
}

/// Plan persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid plan record: {0}")]
    InvalidRecord(String),

    #[error("Failed to serialize plan data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors at the command-line boundary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid input in {origin}: {message}")]
    InvalidInput { origin: String, message: String },

    #[error("Failed to start async runtime: {0}")]
    Runtime(std::io::Error),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
