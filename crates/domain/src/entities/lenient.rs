//! Tolerant field decoders for analysis payloads
//!
//! The analysis service is loose with number and null handling: counts may
//! arrive as floats or `null`, durations as fractional values. These
//! decoders accept anything JSON can carry and fall back to the field's
//! default instead of rejecting the whole event.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `null` decodes as `T::default()`
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn as_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Any finite number or numeric string, otherwise `0.0`
pub(crate) fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_f64(&Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Non-negative count; fractions are truncated, anything else is `0`
pub(crate) fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if let Some(n) = value.as_u64() {
        return Ok(u32::try_from(n).unwrap_or(u32::MAX));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = as_f64(&value).map_or(0, |n| n.clamp(0.0, f64::from(u32::MAX)) as u32);
    Ok(n)
}

/// Optional text; non-string scalars are rendered, `null` is `None`
pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Strings, or a list of strings; other scalars are rendered as text
pub(crate) fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    fn text(value: Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(text).collect(),
        other => text(other).into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "count")]
        count: u32,
        #[serde(default, deserialize_with = "number")]
        number: f64,
        #[serde(default, deserialize_with = "strings")]
        strings: Vec<String>,
        #[serde(default, deserialize_with = "null_as_default")]
        flag: bool,
    }

    fn sample(json: &str) -> Sample {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn counts_accept_floats_nulls_and_strings() {
        assert_eq!(sample(r#"{"count":7}"#).count, 7);
        assert_eq!(sample(r#"{"count":7.9}"#).count, 7);
        assert_eq!(sample(r#"{"count":null}"#).count, 0);
        assert_eq!(sample(r#"{"count":"12"}"#).count, 12);
        assert_eq!(sample(r#"{"count":-3}"#).count, 0);
        assert_eq!(sample(r#"{"count":{"n":1}}"#).count, 0);
    }

    #[test]
    fn numbers_accept_floats_and_nulls() {
        assert!((sample(r#"{"number":5.12}"#).number - 5.12).abs() < f64::EPSILON);
        assert!(sample(r#"{"number":null}"#).number.abs() < f64::EPSILON);
        assert!((sample(r#"{"number":"42"}"#).number - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn strings_accept_single_values_and_mixed_lists() {
        assert_eq!(sample(r#"{"strings":"one"}"#).strings, vec!["one"]);
        assert_eq!(
            sample(r#"{"strings":["a",2,null,true]}"#).strings,
            vec!["a", "2", "true"]
        );
        assert!(sample(r#"{"strings":null}"#).strings.is_empty());
    }

    #[test]
    fn null_flag_is_default() {
        assert!(!sample(r#"{"flag":null}"#).flag);
        assert!(sample(r#"{"flag":true}"#).flag);
    }
}
