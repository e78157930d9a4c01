//! Integration tests for the fitgen binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

use crate::integration::sample_pool;

/// Run the binary with an isolated home and no provider keys.
fn fitgen(temp: &TempDir, args: &[&str]) -> Output {
    let home = temp.path().join("home");
    let config_home = temp.path().join("config");
    fs::create_dir_all(&home).unwrap();
    fs::create_dir_all(&config_home).unwrap();
    Command::new(env!("CARGO_BIN_EXE_fitgen"))
        .args(["--workspace", temp.path().to_str().unwrap(), "--quiet"])
        .args(args)
        .env("HOME", &home)
        .env("XDG_CONFIG_HOME", &config_home)
        .env_remove("GEMINI_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().to_string()
}

const PROFILE: &str = r#"{"weight": 60, "height": 165, "age": 28, "gender": "female",
    "activity_level": "light", "goal": "maintain", "training_location": "home"}"#;

#[test]
fn test_energy_table() {
    let temp = TempDir::new().unwrap();
    let profile = write(temp.path(), "profile.json", PROFILE);
    let output = fitgen(&temp, &["energy", "--profile", &profile]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.contains("TDEE"));
    assert!(text.contains("Protein"));
}

#[test]
fn test_synthesize_workout_json_on_stdout() {
    let temp = TempDir::new().unwrap();
    let pool = write(temp.path(), "pool.json", sample_pool());
    let output = fitgen(
        &temp,
        &["synthesize", "workout", "--split", "upper_lower", "--days", "mon,tue,thu,fri", "--location", "home", "--pool", &pool],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let plan: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(plan["name"], "Upper/Lower - Home");
    assert_eq!(plan["weeks"].as_array().unwrap().len(), 4);
    assert_eq!(plan["weeks"][0]["days"][0]["name"], "Monday - Upper");
    assert_eq!(plan["weeks"][0]["days"][2]["type"], "rest");
}

#[test]
fn test_generate_diet_without_keys_falls_back() {
    let temp = TempDir::new().unwrap();
    let profile = write(temp.path(), "profile.json", PROFILE);
    let output = fitgen(&temp, &["generate", "diet", "--profile", &profile]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let outcome: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(outcome["source"]["kind"], "synthesized");
    assert_eq!(outcome["plan"]["meals"].as_array().unwrap().len(), 4);
}

#[test]
fn test_models_lists_chain_with_missing_keys() {
    let temp = TempDir::new().unwrap();
    let output = fitgen(&temp, &["models", "--format", "json"]);
    assert!(output.status.success());
    let entries: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|entry| entry["configured"] == false));
    assert_eq!(entries[3]["provider"], "openai");
}

#[test]
fn test_invalid_workspace_config_exits_nonzero() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "fitgen.toml", "[generation]\nattempt_timeout_secs = 0\n");
    let output = fitgen(&temp, &["models"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Configuration problem"), "{}", stderr);
    assert!(stderr.contains("attempt_timeout_secs"), "{}", stderr);
}

#[test]
fn test_repair_reads_stdin() {
    use std::io::Write;
    use std::process::Stdio;

    let temp = TempDir::new().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_fitgen"))
        .args(["--workspace", temp.path().to_str().unwrap(), "--quiet", "repair"])
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join("config"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"Result: [{\"name\": \"Oats\", \"fat\": \"6.5g\"}, {\"name\": \"Eg")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value, serde_json::json!([{"name": "Oats", "fat": 7}, {"name": "Eg"}]));
}

#[test]
fn test_saved_plans_persist_across_runs() {
    let temp = TempDir::new().unwrap();
    let profile = write(temp.path(), "profile.json", PROFILE);

    let first = fitgen(&temp, &["synthesize", "diet", "--profile", &profile, "--save-for", "alice"]);
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    let first: serde_json::Value = serde_json::from_str(&stdout(&first)).unwrap();
    let second = fitgen(&temp, &["synthesize", "diet", "--profile", &profile, "--save-for", "alice"]);
    let second: serde_json::Value = serde_json::from_str(&stdout(&second)).unwrap();
    assert_ne!(first["id"], second["id"]);

    let active = fitgen(&temp, &["plans", "active", "--user", "alice", "--category", "diet"]);
    assert!(active.status.success(), "{}", String::from_utf8_lossy(&active.stderr));
    let active: serde_json::Value = serde_json::from_str(&stdout(&active)).unwrap();
    assert_eq!(active["id"], second["id"]);

    let listed = fitgen(&temp, &["plans", "list", "--user", "alice"]);
    let listed: Vec<serde_json::Value> = serde_json::from_str(&stdout(&listed)).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed.iter().filter(|plan| plan["is_active"] == true).count(), 1);
}
