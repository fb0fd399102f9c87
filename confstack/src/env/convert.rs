//! Conversion of raw strings into values of a declared type.
//!
//! Used for environment variables and for default literals, so both accept
//! exactly the same syntax.

use std::time::Duration;

use serde_json::{Map, Number, Value};

use crate::schema::{Kind, ValueType};
use crate::{ConfigError, ConfigResult};

/// Convert `raw` into a record value of type `ty`.
///
/// `key` names the source (an environment variable or a field path) in error
/// messages.
///
/// # Errors
///
/// Returns [`ConfigError::Conversion`] when `raw` is not valid for `ty`.
pub fn convert(raw: &str, ty: ValueType, key: &str) -> ConfigResult<Value> {
    let fail = |message: String| ConfigError::conversion(key, raw, ty.describe(), message);
    match ty.required_type() {
        ValueType::String => Ok(Value::String(raw.to_owned())),
        ValueType::Bool => parse_bool(raw.trim()).map(Value::Bool).ok_or_else(|| {
            fail("expected one of 1, t, true, y, yes, on, 0, f, false, n, no, off".to_owned())
        }),
        ValueType::Int { min, max } => {
            let int = raw.trim().parse::<i64>().map_err(|err| fail(err.to_string()))?;
            if (min..=max).contains(&int) {
                Ok(Value::from(int))
            } else {
                Err(fail(format!("{int} is outside {min}..={max}")))
            }
        }
        ValueType::Uint { max } => {
            let uint = raw.trim().parse::<u64>().map_err(|err| fail(err.to_string()))?;
            if uint <= max {
                Ok(Value::from(uint))
            } else {
                Err(fail(format!("{uint} is outside 0..={max}")))
            }
        }
        ValueType::Float => {
            let float = raw.trim().parse::<f64>().map_err(|err| fail(err.to_string()))?;
            Number::from_f64(float)
                .map(Value::Number)
                .ok_or_else(|| fail("value is not a finite number".to_owned()))
        }
        ValueType::Duration => parse_duration(raw.trim())
            .map(duration_value)
            .map_err(fail),
        ValueType::Time => chrono::DateTime::parse_from_rfc3339(raw.trim())
            .map(|_| Value::String(raw.trim().to_owned()))
            .map_err(|err| fail(err.to_string())),
        ValueType::Slice(element) => convert_slice(raw, element(), key)
            .map_err(|err| err.unwrap_or_else(|| fail("expected a list".to_owned()))),
        ValueType::Struct(_) | ValueType::Map(_) => match parse_document(raw) {
            Ok(value @ Value::Object(_)) => Ok(value),
            Ok(_) => Err(fail("expected a mapping".to_owned())),
            Err(message) => Err(fail(message)),
        },
        // `required_type` strips optional layers.
        ValueType::Optional(inner) => convert(raw, inner(), key),
    }
}

/// Serde's representation of a `std::time::Duration`.
pub(crate) fn duration_value(duration: Duration) -> Value {
    let mut map = Map::new();
    map.insert("secs".to_owned(), Value::from(duration.as_secs()));
    map.insert("nanos".to_owned(), Value::from(duration.subsec_nanos()));
    Value::Object(map)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn looks_like_document(raw: &str) -> bool {
    let trimmed = raw.trim_start();
    trimmed.starts_with('[') || trimmed.starts_with("- ") || raw.contains("\n-")
}

/// Errors carry `None` when the document parsed but was not a list.
fn convert_slice(
    raw: &str,
    element: ValueType,
    key: &str,
) -> Result<Value, Option<std::sync::Arc<ConfigError>>> {
    if looks_like_document(raw) {
        let document = parse_document(raw)
            .map_err(|message| Some(ConfigError::conversion(key, raw, "list", message)))?;
        let Value::Array(items) = document else {
            return Err(None);
        };
        return items
            .into_iter()
            .map(|item| coerce(item, element, key))
            .collect::<ConfigResult<Vec<_>>>()
            .map(Value::Array)
            .map_err(Some);
    }
    raw.split(',')
        .map(|item| convert(item.trim(), element, key))
        .collect::<ConfigResult<Vec<_>>>()
        .map(Value::Array)
        .map_err(Some)
}

/// Bring a decoded document element in line with the declared element type.
fn coerce(item: Value, ty: ValueType, key: &str) -> ConfigResult<Value> {
    match (item, ty.kind()) {
        (Value::String(text), kind) if kind != Kind::Struct && kind != Kind::Map => {
            convert(&text, ty, key)
        }
        (item @ (Value::Number(_) | Value::Bool(_)), Kind::String) => {
            Ok(Value::String(item.to_string()))
        }
        (item, _) => Ok(item),
    }
}

/// Parse a YAML (or, without YAML support, JSON) document.
pub(crate) fn parse_document(raw: &str) -> Result<Value, String> {
    #[cfg(feature = "yaml")]
    {
        serde_saphyr::from_str_with_options::<Value>(
            raw,
            serde_saphyr::Options {
                strict_booleans: true,
                ..serde_saphyr::Options::default()
            },
        )
        .map_err(|err| err.to_string())
    }
    #[cfg(not(feature = "yaml"))]
    {
        serde_json::from_str::<Value>(raw).map_err(|err| err.to_string())
    }
}

const NANOS_PER_UNIT: [(&str, u128); 8] = [
    ("ns", 1),
    ("us", 1_000),
    ("\u{b5}s", 1_000),
    ("\u{3bc}s", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60_000_000_000),
    ("h", 3_600_000_000_000),
];

/// Parse a duration literal such as `300ms`, `1.5h` or `2h45m`.
///
/// A bare `0` is accepted; every other number needs a unit. Negative
/// durations are rejected.
pub(crate) fn parse_duration(raw: &str) -> Result<Duration, String> {
    let text = raw.strip_prefix('+').unwrap_or(raw);
    if text.starts_with('-') {
        return Err("negative durations are not supported".to_owned());
    }
    if text == "0" {
        return Ok(Duration::ZERO);
    }
    if text.is_empty() {
        return Err("empty duration".to_owned());
    }

    let mut chars = text.chars().peekable();
    let mut total: u128 = 0;
    while chars.peek().is_some() {
        let mut whole = String::new();
        let mut fraction = String::new();
        while let Some(digit) = chars.next_if(char::is_ascii_digit) {
            whole.push(digit);
        }
        if chars.next_if_eq(&'.').is_some() {
            while let Some(digit) = chars.next_if(char::is_ascii_digit) {
                fraction.push(digit);
            }
        }
        if whole.is_empty() && fraction.is_empty() {
            return Err(format!("invalid duration {raw:?}"));
        }
        let mut unit = String::new();
        while let Some(letter) = chars.next_if(|c| !c.is_ascii_digit() && *c != '.') {
            unit.push(letter);
        }
        let scale = NANOS_PER_UNIT
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| {
                if unit.is_empty() {
                    format!("missing unit in duration {raw:?}")
                } else {
                    format!("unknown unit {unit:?} in duration {raw:?}")
                }
            })?;
        total = total
            .checked_add(component(&whole, &fraction, scale).ok_or("duration is too large")?)
            .ok_or("duration is too large")?;
    }
    u64::try_from(total)
        .map(Duration::from_nanos)
        .map_err(|_| "duration is too large".to_owned())
}

fn component(whole: &str, fraction: &str, scale: u128) -> Option<u128> {
    let whole_value = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().ok()?
    };
    let mut nanos = whole_value.checked_mul(scale)?;
    if !fraction.is_empty() {
        // Digits beyond nanosecond precision cannot contribute.
        let digits: String = fraction.chars().take(20).collect();
        let numerator = digits.parse::<u128>().ok()?;
        let exponent = u32::try_from(digits.len()).ok()?;
        let denominator = 10_u128.checked_pow(exponent)?;
        nanos = nanos.checked_add(numerator.checked_mul(scale)?.checked_div(denominator)?)?;
    }
    Some(nanos)
}
