//! Lenient numeric handling for record fields that may arrive as text
//!
//! Compound and protocol records come from form inputs, so a half-life can show up
//! as `12`, `12.5` or `"12.5"`. Parsing never fails on malformed numbers: anything
//! that is not a float becomes `NaN`, and the simulator maps `NaN` to a zero
//! contribution through [`or_zero`].

use serde::{Deserialize, Deserializer};

/// Parse numeric text with standard float parsing
///
/// Surrounding whitespace is ignored. Non-numeric text yields `NaN`.
pub fn parse_numeric(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Replace a non-finite value with zero
pub fn or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Values that can be read as a float, possibly by parsing text
pub trait AsNumeric {
    /// The numeric value, or `NaN` if it cannot be read as a number
    fn as_numeric(&self) -> f64;
}

impl AsNumeric for f64 {
    fn as_numeric(&self) -> f64 {
        *self
    }
}

impl AsNumeric for f32 {
    fn as_numeric(&self) -> f64 {
        *self as f64
    }
}

impl AsNumeric for i32 {
    fn as_numeric(&self) -> f64 {
        *self as f64
    }
}

impl AsNumeric for u32 {
    fn as_numeric(&self) -> f64 {
        *self as f64
    }
}

impl AsNumeric for &str {
    fn as_numeric(&self) -> f64 {
        parse_numeric(self)
    }
}

impl AsNumeric for String {
    fn as_numeric(&self) -> f64 {
        parse_numeric(self)
    }
}

/// Either a JSON number or a JSON string holding a number
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

pub(crate) fn nan() -> f64 {
    f64::NAN
}

/// Deserialize a required numeric field, accepting numbers and numeric text
///
/// `null` reads as `NaN`, which is also how `serde_json` writes a `NaN`.
pub(crate) fn lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        None => f64::NAN,
        Some(NumberOrText::Number(value)) => value,
        Some(NumberOrText::Text(text)) => parse_numeric(&text),
    })
}

/// Deserialize an optional numeric field
///
/// `null` and blank text both mean "not provided".
pub(crate) fn lenient_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<NumberOrText>::deserialize(deserializer)? {
            None => None,
            Some(NumberOrText::Number(value)) => Some(value),
            Some(NumberOrText::Text(text)) if text.trim().is_empty() => None,
            Some(NumberOrText::Text(text)) => Some(parse_numeric(&text)),
        },
    )
}
