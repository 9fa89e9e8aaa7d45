//! Serde helpers for server fields with inconsistent JSON types.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads a string, number or bool as `Option<String>`; `null` becomes `None`.
///
/// # Errors
/// Returns an error if the input is not valid JSON for this field.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Like [`opt_string`] but maps `null` to an empty string.
///
/// # Errors
/// Returns an error if the input is not valid JSON for this field.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    opt_string(deserializer).map(Option::unwrap_or_default)
}

/// Reads an integer id sent either as a JSON number or a numeric string.
///
/// # Errors
/// Returns an error if the value is not an integer.
pub fn id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom(format!("id out of range: {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid id: {s:?}"))),
        other => Err(D::Error::custom(format!("expected id, got {other}"))),
    }
}

/// Reads a money amount sent as a JSON number, a numeric string, or `null` (zero).
///
/// # Errors
/// Returns an error if the value does not parse as a decimal.
pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Decimal::ZERO),
        Some(Value::Number(n)) => parse_decimal(&n.to_string()).map_err(D::Error::custom),
        Some(Value::String(s)) => parse_decimal(&s).map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!("expected amount, got {other}"))),
    }
}

/// Parses user or server text into a decimal, accepting scientific notation.
///
/// # Errors
/// Returns a message naming the rejected input.
pub fn parse_decimal(input: &str) -> Result<Decimal, String> {
    let trimmed = input.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| format!("invalid amount: {trimmed:?}"))
}
