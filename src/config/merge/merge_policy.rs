//! Merge rules: defaults first, later sources override by key path.
//! Arrays (such as a provider's model list) are replaced, not appended.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Create a Config builder with the built-in defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("providers.primary.kind", "gemini")?
        .set_default(
            "providers.primary.models",
            vec!["gemini-2.5-flash", "gemini-2.0-flash", "gemini-2.0-flash-lite"],
        )?
        .set_default("providers.primary.api_key_env", "GEMINI_API_KEY")?
        .set_default("providers.secondary.kind", "openai")?
        .set_default("providers.secondary.models", vec!["gpt-4o-mini"])?
        .set_default("providers.secondary.api_key_env", "OPENAI_API_KEY")?
        .set_default("generation.attempt_timeout_secs", 60)?
        .set_default("generation.temperature", 0.7)?
        .set_default("generation.max_output_tokens", 8192)?
        .set_default("storage.store_path", ".fitgen/store")
}

/// Environment overrides, e.g. `FITGEN__GENERATION__ATTEMPT_TIMEOUT_SECS=30`.
pub fn environment_source() -> Environment {
    Environment::with_prefix("FITGEN")
        .separator("__")
        .try_parsing(true)
}
