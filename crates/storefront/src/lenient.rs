//! Lenient deserializers for marketplace JSON.
//!
//! The marketplace is inconsistent about numeric fields: prices arrive as
//! numbers or decimal strings, stock counts as integers or digit strings, and
//! optional values as `null` or `""`.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, de::Error};
use serde_json::{Number, Value};
use tracing::warn;

fn number_to_decimal(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn value_to_decimal(value: Option<Value>) -> Result<Option<Decimal>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => number_to_decimal(&n)
            .map(Some)
            .ok_or_else(|| format!("number {n} is not a valid decimal")),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Decimal::from_str(s.trim())
            .map(Some)
            .map_err(|e| format!("invalid decimal {s:?}: {e}")),
        Some(other) => Err(format!("expected a decimal, got {other}")),
    }
}

/// Optional decimal: number, decimal string, `null` or `""`.
///
/// # Errors
///
/// Fails on strings that are not decimals and on non-scalar values.
pub fn opt_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    value_to_decimal(Option::<Value>::deserialize(deserializer)?).map_err(D::Error::custom)
}

/// Decimal that treats `null` and `""` as zero.
///
/// # Errors
///
/// Fails on strings that are not decimals and on non-scalar values.
pub fn decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    opt_decimal(deserializer).map(Option::unwrap_or_default)
}

/// Non-negative count: integer, digit string, `null` or `""` (zero).
///
/// Negative counts clamp to zero.
///
/// # Errors
///
/// Fails on non-numeric strings and non-scalar values.
pub fn count_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let decimal = value_to_decimal(Option::<Value>::deserialize(deserializer)?)
        .map_err(D::Error::custom)?
        .unwrap_or_default();

    if decimal.is_sign_negative() {
        return Ok(0);
    }

    decimal
        .trunc()
        .to_u32()
        .ok_or_else(|| D::Error::custom(format!("count {decimal} out of range")))
}

/// Any `Default` type, with `null` read as the default.
///
/// # Errors
///
/// Fails if a non-null value does not match `T`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Boolean flag sent as `true`/`false`, `0`/`1` or a string such as
/// `"yes"`. Anything unrecognized is `false`.
///
/// # Errors
///
/// Fails only if the input is not valid JSON.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f.abs() > f64::EPSILON),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "y"
        ),
        _ => false,
    })
}

/// Optional timestamp: RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC), `YYYY-MM-DD`
/// or `DD-MM-YYYY` (midnight UTC). Empty and `null` are absent.
///
/// Anything else, including non-string values, is logged and read as absent.
///
/// # Errors
///
/// Fails only if the input is not valid JSON.
pub fn opt_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => {
            let parsed = parse_timestamp(s.trim());
            if parsed.is_none() {
                warn!(value = %s, "Ignoring unrecognized timestamp");
            }
            parsed
        }
        Some(other) => {
            warn!(value = %other, "Ignoring non-string timestamp");
            None
        }
    })
}

/// Parse the timestamp formats the marketplace emits.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    ["%Y-%m-%d", "%d-%m-%Y"]
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
