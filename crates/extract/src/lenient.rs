//! Deserializers for fields a language model fills in loosely: scores that
//! arrive as strings, text fields that arrive as `null` or numbers, and lists
//! that arrive as a single comma-separated string.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const MAX_SCORE: u8 = 100;

/// Clamp any numeric reading into `0..=100`. Unreadable values become 0.
pub fn clamp_score(value: &Value) -> u8 {
    let reading = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };

    match reading {
        Some(v) if v.is_finite() => v.round().clamp(0.0, f64::from(MAX_SCORE)) as u8,
        _ => 0,
    }
}

pub fn score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(clamp_score(&value))
}

pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// A categorical field; `null` or blank gives the type's default.
pub fn open_enum<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String> + Default,
{
    let raw = text(deserializer)?;
    Ok(if raw.trim().is_empty() { T::default() } else { T::from(raw) })
}

/// A categorical field the model may leave out; `null` or blank is `None`.
pub fn optional_enum<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let raw = text(deserializer)?;
    Ok(if raw.trim().is_empty() { None } else { Some(T::from(raw)) })
}

pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let reading = match &value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(reading.map(|n| n.min(u64::from(u32::MAX)) as u32).unwrap_or(0))
}

pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    })
}
