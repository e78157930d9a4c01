//! Integration tests for layered configuration loading

use fitgen::config::{global_config_path, ConfigLoader, WORKSPACE_CONFIG_FILE};
use fitgen::orchestrator::FallbackOrchestrator;
use fitgen::provider::ProviderKind;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

use crate::integration::with_config_home;

fn write_global(contents: &str) {
    let path = global_config_path().unwrap();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn test_defaults_without_any_file() {
    let test_dir = TempDir::new().unwrap();
    with_config_home(&test_dir, || {
        let workspace = test_dir.path().join("ws");
        fs::create_dir_all(&workspace).unwrap();

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.providers.primary.kind, ProviderKind::Gemini);
        assert_eq!(config.providers.primary.models.len(), 3);
        let secondary = config.providers.secondary.as_ref().unwrap();
        assert_eq!(secondary.kind, ProviderKind::OpenAI);
        assert_eq!(secondary.models, vec!["gpt-4o-mini"]);
        assert_eq!(config.generation.attempt_timeout(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    });
}

#[test]
fn test_workspace_file_overrides_global_file() {
    let test_dir = TempDir::new().unwrap();
    with_config_home(&test_dir, || {
        write_global(
            r#"
[generation]
attempt_timeout_secs = 20
temperature = 0.3

[providers.primary]
kind = "gemini"
models = ["gemini-global"]
api_key = "global-key"
"#,
        );
        let workspace = test_dir.path().join("ws");
        fs::create_dir_all(&workspace).unwrap();
        fs::write(
            workspace.join(WORKSPACE_CONFIG_FILE),
            r#"
[generation]
attempt_timeout_secs = 45

[providers.primary]
models = ["gemini-a", "gemini-b"]
"#,
        )
        .unwrap();

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.generation.attempt_timeout_secs, 45);
        assert!((config.generation.temperature - 0.3).abs() < 1e-6);
        assert_eq!(config.providers.primary.models, vec!["gemini-a", "gemini-b"]);
        assert_eq!(config.providers.primary.api_key.as_deref(), Some("global-key"));

        let orchestrator = FallbackOrchestrator::from_config(&config).unwrap();
        let labels: Vec<String> = orchestrator.entries().iter().map(|entry| entry.label()).collect();
        assert_eq!(labels[..2], ["gemini/gemini-a".to_string(), "gemini/gemini-b".to_string()]);
        assert_eq!(orchestrator.attempt_timeout(), Duration::from_secs(45));
    });
}

#[test]
fn test_explicit_file_skips_global_and_must_exist() {
    let test_dir = TempDir::new().unwrap();
    with_config_home(&test_dir, || {
        write_global("[generation]\nattempt_timeout_secs = 5\n");
        let explicit = test_dir.path().join("explicit.toml");
        fs::write(&explicit, "[generation]\nmax_output_tokens = 1024\n").unwrap();

        let config = ConfigLoader::load_from_file(&explicit).unwrap();
        assert_eq!(config.generation.attempt_timeout_secs, 60);
        assert_eq!(config.generation.max_output_tokens, 1024);

        assert!(ConfigLoader::load_from_file(&test_dir.path().join("missing.toml")).is_err());
    });
}

#[test]
fn test_secondary_with_several_models_fails_validation() {
    let test_dir = TempDir::new().unwrap();
    with_config_home(&test_dir, || {
        let explicit = test_dir.path().join("two.toml");
        fs::write(
            &explicit,
            r#"
[providers.secondary]
kind = "openai"
models = ["gpt-4o-mini", "gpt-4o"]
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&explicit).unwrap();
        let message = config.validated().unwrap_err().to_string();
        assert!(message.contains("secondary"), "{}", message);
        assert!(message.contains("Exactly one model"), "{}", message);
    });
}

#[test]
fn test_redacted_rendering_hides_inline_keys() {
    let test_dir = TempDir::new().unwrap();
    with_config_home(&test_dir, || {
        let explicit = test_dir.path().join("keys.toml");
        fs::write(&explicit, "[providers.primary]\napi_key = \"very-secret\"\n").unwrap();

        let config = ConfigLoader::load_from_file(&explicit).unwrap();
        let shown = config.to_redacted_toml().unwrap();
        assert!(!shown.contains("very-secret"));
        assert!(shown.contains("********"));
        assert!(shown.contains("GEMINI_API_KEY"));
    });
}
