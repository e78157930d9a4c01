//! Configuration System
//!
//! Layered configuration: built-in defaults, the global config file, the
//! workspace `fitgen.toml` (or an explicit file), then `FITGEN__*` environment
//! overrides. Validation is separate from loading so callers can report every
//! problem at once.

use crate::error::GenerationError;
use crate::logging::LoggingConfig;
use crate::provider::{GenerationOptions, ProviderKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod global_file;
    pub mod workspace_file;
}

pub use sources::global_file::global_config_path;
pub use sources::workspace_file::WORKSPACE_CONFIG_FILE;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitgenConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for FitgenConfig {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig::default(),
            generation: GenerationSettings::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Where saved plans and points live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Sled database directory; relative paths resolve against the workspace.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".fitgen/store")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

impl StorageConfig {
    pub fn resolve_store_path(&self, workspace_root: &Path) -> PathBuf {
        if self.store_path.is_absolute() {
            self.store_path.clone()
        } else {
            workspace_root.join(&self.store_path)
        }
    }
}

/// Primary provider (ordered model list) and optional secondary provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "ProviderConfig::default_primary")]
    pub primary: ProviderConfig,

    #[serde(default = "default_secondary")]
    pub secondary: Option<ProviderConfig>,
}

fn default_secondary() -> Option<ProviderConfig> {
    Some(ProviderConfig::default_secondary())
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            primary: ProviderConfig::default_primary(),
            secondary: default_secondary(),
        }
    }
}

/// One provider: its API family, models in priority order and credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    #[serde(default)]
    pub models: Vec<String>,

    /// Inline key. Prefer `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn default_primary() -> Self {
        Self {
            kind: ProviderKind::Gemini,
            models: vec![
                "gemini-2.5-flash".to_string(),
                "gemini-2.0-flash".to_string(),
                "gemini-2.0-flash-lite".to_string(),
            ],
            api_key: None,
            api_key_env: Some("GEMINI_API_KEY".to_string()),
            base_url: None,
        }
    }

    pub fn default_secondary() -> Self {
        Self {
            kind: ProviderKind::OpenAI,
            models: vec!["gpt-4o-mini".to_string()],
            api_key: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            base_url: None,
        }
    }

    /// Inline key first, then the named environment variable. Blank values
    /// count as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        let inline = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);
        inline.or_else(|| {
            self.api_key_env
                .as_deref()
                .and_then(|var| std::env::var(var).ok())
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
        })
    }

    /// A provider without a resolvable key contributes no model entries.
    pub fn is_configured(&self) -> bool {
        self.resolve_api_key().is_some()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.models.is_empty() {
            return Err("At least one model is required".to_string());
        }
        if self.models.iter().any(|m| m.trim().is_empty()) {
            return Err("Model names cannot be empty".to_string());
        }
        if let Some(base_url) = &self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(format!("Invalid base_url '{}': must be http(s)", base_url));
            }
        }
        Ok(())
    }
}

/// Per-request generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Fixed per-attempt deadline, independent of how many attempts remain.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_attempt_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    8192
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            attempt_timeout_secs: default_attempt_timeout_secs(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl GenerationSettings {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: Some(self.temperature),
            max_output_tokens: Some(self.max_output_tokens),
            json_response: true,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Provider(String, String),
    Generation(String),
    Storage(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(name, msg) => write!(f, "Provider '{}': {}", name, msg),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl FitgenConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.providers.primary.validate() {
            errors.push(ValidationError::Provider("primary".to_string(), e));
        }

        if let Some(secondary) = &self.providers.secondary {
            if let Err(e) = secondary.validate() {
                errors.push(ValidationError::Provider("secondary".to_string(), e));
            } else if secondary.models.len() != 1 {
                errors.push(ValidationError::Provider(
                    "secondary".to_string(),
                    format!(
                        "Exactly one model is allowed, found {}",
                        secondary.models.len()
                    ),
                ));
            }
        }

        if self.generation.attempt_timeout_secs == 0 {
            errors.push(ValidationError::Generation(
                "attempt_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            errors.push(ValidationError::Generation(format!(
                "temperature {} is outside 0.0..=2.0",
                self.generation.temperature
            )));
        }
        if self.generation.max_output_tokens == 0 {
            errors.push(ValidationError::Generation(
                "max_output_tokens must be greater than zero".to_string(),
            ));
        }

        if self.storage.store_path.as_os_str().is_empty() {
            errors.push(ValidationError::Storage(
                "store_path cannot be empty".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold all problems into one error.
    pub fn validated(self) -> Result<Self, GenerationError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            GenerationError::Config(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(self)
    }

    /// TOML rendering with inline keys redacted.
    pub fn to_redacted_toml(&self) -> Result<String, GenerationError> {
        let mut shown = self.clone();
        redact(&mut shown.providers.primary);
        if let Some(secondary) = shown.providers.secondary.as_mut() {
            redact(secondary);
        }
        toml::to_string_pretty(&shown)
            .map_err(|e| GenerationError::Config(format!("Failed to render config: {}", e)))
    }
}

fn redact(provider: &mut ProviderConfig) {
    if provider.api_key.is_some() {
        provider.api_key = Some("********".to_string());
    }
}

/// Loads [`FitgenConfig`] from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// defaults, global file, `<workspace_root>/fitgen.toml`, environment.
    pub fn load(workspace_root: &Path) -> Result<FitgenConfig, GenerationError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let config = builder
            .add_source(merge::merge_policy::environment_source())
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// defaults, the given file (required), environment. The global file is
    /// skipped so an explicit file fully describes the setup.
    pub fn load_from_file(path: &Path) -> Result<FitgenConfig, GenerationError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::workspace_file::add_explicit(builder, path)?;
        let config = builder
            .add_source(merge::merge_policy::environment_source())
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
