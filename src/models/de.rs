//! Lenient deserializers for backend fields that arrive as either strings or numbers.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum AnyValue {
    String(String),
    Number(i64),
    Float(f64),
    Bool(bool),
}

impl AnyValue {
    fn into_string(self) -> String {
        match self {
            AnyValue::String(s) => s,
            AnyValue::Number(n) => n.to_string(),
            AnyValue::Float(f) => f.to_string(),
            AnyValue::Bool(b) => b.to_string(),
        }
    }
}

pub fn string_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(AnyValue::deserialize(deserializer)?.into_string())
}

pub fn option_string_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<AnyValue>::deserialize(deserializer)?.map(AnyValue::into_string))
}

/// Counters sometimes come back as strings ("50") from form-backed endpoints.
pub fn u32_from_any<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match AnyValue::deserialize(deserializer)? {
        AnyValue::Number(n) => u32::try_from(n).map_err(serde::de::Error::custom),
        AnyValue::Float(f) if f >= 0.0 => Ok(f as u32),
        AnyValue::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected a count, got {}",
            other.into_string()
        ))),
    }
}

pub fn option_u32_from_any<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "u32_from_any")] u32);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
}
