//! CLI presentation: tables and JSON rendering for command results.

use crate::config::{FitgenConfig, ProviderConfig};
use crate::error::CliError;
use crate::nutrition::EnergySummary;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde::Serialize;

pub fn format_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

pub fn format_energy_text(summary: &EnergySummary) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["BMR".to_string(), format!("{:.1} kcal", summary.bmr)]);
    table.add_row(vec!["TDEE".to_string(), format!("{} kcal", summary.tdee)]);
    table.add_row(vec![
        "Daily goal".to_string(),
        format!("{} kcal", summary.daily_calories),
    ]);
    table.add_row(vec![
        "Protein".to_string(),
        format!("{} g ({})", summary.macros.protein, percent(summary.distribution.protein)),
    ]);
    table.add_row(vec![
        "Carbs".to_string(),
        format!("{} g ({})", summary.macros.carbs, percent(summary.distribution.carbs)),
    ]);
    table.add_row(vec![
        "Fat".to_string(),
        format!("{} g ({})", summary.macros.fat, percent(summary.distribution.fat)),
    ]);
    table.to_string()
}

/// One row of the fallback chain listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainEntry {
    pub order: usize,
    pub role: String,
    pub provider: String,
    pub model: String,
    pub configured: bool,
}

/// Every model entry the configuration names, in attempt order, including
/// providers that are skipped for lack of a key.
pub fn chain_entries(config: &FitgenConfig) -> Vec<ChainEntry> {
    let mut rows: Vec<(&str, &ProviderConfig, &String)> = config
        .providers
        .primary
        .models
        .iter()
        .map(|model| ("primary", &config.providers.primary, model))
        .collect();
    if let Some(secondary) = &config.providers.secondary {
        if let Some(model) = secondary.models.first() {
            rows.push(("secondary", secondary, model));
        }
    }
    rows.into_iter()
        .enumerate()
        .map(|(index, (role, provider, model))| ChainEntry {
            order: index + 1,
            role: role.to_string(),
            provider: provider.kind.as_str().to_string(),
            model: model.clone(),
            configured: provider.is_configured(),
        })
        .collect()
}

pub fn format_models_text(entries: &[ChainEntry], attempt_timeout_secs: u64) -> String {
    let mut out = String::new();
    if entries.is_empty() {
        out.push_str("No models configured.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Role", "Provider", "Model", "Key"]);
    for entry in entries {
        table.add_row(vec![
            entry.order.to_string(),
            entry.role.clone(),
            entry.provider.clone(),
            entry.model.clone(),
            if entry.configured { "set" } else { "missing" }.to_string(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out.push_str(&format!("Per-attempt timeout: {}s", attempt_timeout_secs));
    out
}
