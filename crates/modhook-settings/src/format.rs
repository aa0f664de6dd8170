//! Flat `key: value` text format
//!
//! ```text
//! # free camera
//! speed: 2.5
//! invert_y: false
//! label: photo mode
//! ```
//!
//! Keys are the serde field names of a flat settings struct. Values are
//! written in their scalar text form, strings unquoted. Lines starting with
//! `#` and blank lines are ignored.
//!
//! A single space after the colon is the separator. Everything after it is
//! the value, so strings keep their leading and trailing whitespace; numbers
//! and booleans are read with surrounding whitespace ignored.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Result, SettingsError};

const COMMENT: char = '#';
const SEPARATOR: char = ' ';

/// Render `value` as flat text, one field per line, sorted by key.
///
/// `None` fields are omitted.
///
/// # Errors
///
/// [`SettingsError::NotFlat`] if `value` is not a struct of scalars, and
/// [`SettingsError::InvalidValue`] for strings spanning several lines.
pub fn to_flat_text<T: Serialize>(value: &T) -> Result<String> {
    let fields = flat_fields(serde_json::to_value(value)?)?;

    let mut out = String::new();
    for (key, value) in &fields {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => {
                if s.contains('\n') || s.contains('\r') {
                    return Err(SettingsError::InvalidValue {
                        key: key.clone(),
                        reason: "line breaks are not supported".to_string(),
                    });
                }
                s.clone()
            }
            other => other.to_string(),
        };
        out.push_str(key);
        out.push_str(": ");
        out.push_str(&text);
        out.push('\n');
    }
    Ok(out)
}

/// Parse flat text over `T::default()`.
///
/// Each value is coerced to whatever the field accepts. Unknown keys,
/// malformed lines and values the field rejects are logged and skipped, so
/// the field keeps its default. A key given twice takes the last value.
///
/// # Errors
///
/// [`SettingsError::NotFlat`] if `T` is not a struct of scalars.
pub fn from_flat_text<T>(text: &str) -> Result<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    let mut fields = flat_fields(serde_json::to_value(T::default())?)?;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim_start();
        if line.trim_end().is_empty() || line.starts_with(COMMENT) {
            continue;
        }

        let Some((key, raw)) = line.split_once(':') else {
            warn!(line = line_no, content = line, "Skipping malformed settings line");
            continue;
        };
        let key = key.trim_end();
        let raw = raw.strip_prefix(SEPARATOR).unwrap_or(raw);

        if !fields.contains_key(key) {
            warn!(line = line_no, key, "Skipping unknown setting");
            continue;
        }

        match accept_value::<T>(&fields, key, raw) {
            Some(value) => {
                fields.insert(key.to_string(), value);
            }
            None => {
                warn!(line = line_no, key, value = raw, "Invalid setting value, keeping default");
            }
        }
    }

    debug!(fields = fields.len(), "Settings parsed");
    Ok(serde_json::from_value(Value::Object(fields))?)
}

/// Top-level fields, checking every one is a scalar
fn flat_fields(value: Value) -> Result<Map<String, Value>> {
    let Value::Object(fields) = value else {
        return Err(SettingsError::NotFlat(
            "top level is not a struct".to_string(),
        ));
    };
    if let Some((key, _)) = fields
        .iter()
        .find(|(_, v)| matches!(v, Value::Array(_) | Value::Object(_)))
    {
        return Err(SettingsError::NotFlat(format!("field '{}' is nested", key)));
    }
    Ok(fields)
}

/// First interpretation of `raw` that `T` accepts for `key`
fn accept_value<T>(fields: &Map<String, Value>, key: &str, raw: &str) -> Option<Value>
where
    T: DeserializeOwned,
{
    scalar_candidates(raw).into_iter().find(|candidate| {
        let mut trial = fields.clone();
        trial.insert(key.to_string(), candidate.clone());
        serde_json::from_value::<T>(Value::Object(trial)).is_ok()
    })
}

/// Readings of `raw`, most specific first.
///
/// Only the string reading keeps surrounding whitespace.
fn scalar_candidates(raw: &str) -> Vec<Value> {
    let scalar = raw.trim();
    let mut candidates = Vec::new();
    if scalar.eq_ignore_ascii_case("true") {
        candidates.push(Value::Bool(true));
    } else if scalar.eq_ignore_ascii_case("false") {
        candidates.push(Value::Bool(false));
    }
    if let Ok(n) = scalar.parse::<i64>() {
        candidates.push(Value::from(n));
    } else if let Ok(n) = scalar.parse::<u64>() {
        candidates.push(Value::from(n));
    }
    if let Some(n) = scalar
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
    {
        candidates.push(Value::Number(n));
    }
    candidates.push(Value::String(raw.to_string()));
    candidates
}
