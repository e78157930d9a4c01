//! Structured Output Repair
//!
//! Extracts one JSON value from free-form model output. Model responses are
//! often wrapped in markdown fences, prefixed with prose, or cut off mid-value
//! when the provider hits its output limit. Extraction escalates through three
//! tiers and stops at the first that parses; when none does the result is
//! `None`:
//!
//! 1. direct parse of the text from the first `{` or `[`
//! 2. structural repair: close an open string, drop a dangling comma, close
//!    every open delimiter
//! 3. truncate to the last `}` or `]` and parse that prefix
//!
//! Whatever tier wins, numeric nutrition fields are coerced to non-negative
//! integers before the value is returned.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Object fields always coerced to non-negative integers.
pub const NUMERIC_FIELDS: [&str; 4] = ["calories", "protein", "carbs", "fat"];

/// Which extraction tier produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairTier {
    Direct,
    Structural,
    TruncatedToDelimiter,
}

/// What was wrong with the text, as far as a single scan can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    /// Parsed as-is.
    Clean,
    /// The scan ended inside a string or with unclosed delimiters, which is
    /// what an output-length cutoff looks like.
    Truncated,
    /// Delimiters balanced but the text still failed to parse.
    Malformed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepairReport {
    pub value: Value,
    pub tier: RepairTier,
    pub damage: Damage,
}

/// Extract and repair one JSON value from `raw`. Returns `None` when nothing
/// usable can be recovered; never panics.
pub fn repair_json(raw: &str) -> Option<Value> {
    repair_json_with_report(raw).map(|report| report.value)
}

/// Repair and deserialize into a typed record.
pub fn repair_as<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let value = repair_json(raw)?;
    match serde_json::from_value(value) {
        Ok(typed) => Some(typed),
        Err(e) => {
            debug!(error = %e, "Repaired value does not match the requested shape");
            None
        }
    }
}

/// Like [`repair_json`], but also reports the tier used and the damage found.
pub fn repair_json_with_report(raw: &str) -> Option<RepairReport> {
    let text = strip_code_fences(raw);
    let start = match (text.find('{'), text.find('[')) {
        (Some(object), Some(array)) => object.min(array),
        (Some(object), None) => object,
        (None, Some(array)) => array,
        (None, None) => {
            debug!(len = raw.len(), "No JSON delimiter in model output");
            return None;
        }
    };
    let candidate = &text[start..];

    if let Some(value) = parse(candidate) {
        return Some(finish(value, RepairTier::Direct, Damage::Clean));
    }

    let scan = scan(candidate);
    let damage = if scan.is_truncated() {
        Damage::Truncated
    } else {
        Damage::Malformed
    };

    let tiers: [(RepairTier, fn(&str, &Scan) -> Option<Value>); 2] = [
        (RepairTier::Structural, close_and_parse),
        (RepairTier::TruncatedToDelimiter, truncate_to_last_delimiter),
    ];

    for (tier, attempt) in tiers {
        if let Some(value) = attempt(candidate, &scan) {
            return Some(finish(value, tier, damage));
        }
    }

    warn!(
        damage = ?damage,
        len = candidate.len(),
        open_delimiters = scan.stack.len(),
        "Structured output could not be repaired"
    );
    None
}

fn finish(mut value: Value, tier: RepairTier, damage: Damage) -> RepairReport {
    if tier != RepairTier::Direct {
        debug!(tier = ?tier, damage = ?damage, "Structured output repaired");
    }
    coerce_numeric_fields(&mut value);
    RepairReport {
        value,
        tier,
        damage,
    }
}

fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "")
}

fn parse(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// Result of one left-to-right pass over the candidate text.
struct Scan {
    /// Closers owed, innermost last.
    stack: Vec<char>,
    in_string: bool,
    /// The final character was an unconsumed backslash inside a string.
    escaped: bool,
}

impl Scan {
    fn is_truncated(&self) -> bool {
        self.in_string || !self.stack.is_empty()
    }
}

fn scan(text: &str) -> Scan {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.last() == Some(&c) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    Scan {
        stack,
        in_string,
        escaped,
    }
}

fn close_and_parse(text: &str, scan: &Scan) -> Option<Value> {
    parse(&close_structure(text, scan))
}

fn close_structure(text: &str, scan: &Scan) -> String {
    let mut repaired = text.to_string();
    if scan.in_string {
        if scan.escaped {
            repaired.pop();
        }
        repaired.push('"');
    }
    let trimmed = repaired.trim_end().len();
    repaired.truncate(trimmed);
    if repaired.ends_with(',') {
        repaired.pop();
    }
    repaired.extend(scan.stack.iter().rev());
    repaired
}

fn truncate_to_last_delimiter(text: &str, _scan: &Scan) -> Option<Value> {
    let cut = text.rfind(|c: char| c == '}' || c == ']')?;
    parse(&text[..=cut])
}

/// Coerce every nutrition field in `value`, at any depth, to a non-negative
/// integer.
pub fn coerce_numeric_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if NUMERIC_FIELDS.contains(&key.as_str()) {
                    *field = Value::from(coerce_amount(field));
                } else {
                    coerce_numeric_fields(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(coerce_numeric_fields),
        _ => {}
    }
}

fn coerce_amount(value: &Value) -> u64 {
    numeric_value(value).map(round_non_negative).unwrap_or(0)
}

/// A JSON number as-is, or the leading number of a string. `None` otherwise.
pub(crate) fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => leading_number(text),
        _ => None,
    }
}

/// Numeric prefix of `text`, e.g. `"120kcal"` -> 120.0, `" 12.5 g"` -> 12.5.
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (offset, c) in text.char_indices() {
        match c {
            '-' | '+' if offset == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = offset + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    text[..end].trim_end_matches('.').parse().ok()
}

fn round_non_negative(amount: f64) -> u64 {
    if amount.is_finite() && amount > 0.0 {
        amount.round() as u64
    } else {
        0
    }
}
