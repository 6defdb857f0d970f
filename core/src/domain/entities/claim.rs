//! Claims supplied to the signer

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use super::token_type::TokenType;
use crate::errors::SigningError;

/// Value of a caller-supplied claim.
///
/// Only these shapes can be signed. Text and token types are encoded as
/// JSON strings, timestamps as integer Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimValue {
    Text(String),
    Timestamp(DateTime<Utc>),
    TokenType(TokenType),
}

impl ClaimValue {
    pub fn to_json(&self) -> Value {
        match self {
            ClaimValue::Text(text) => Value::String(text.clone()),
            ClaimValue::Timestamp(at) => Value::from(at.timestamp()),
            ClaimValue::TokenType(token_type) => Value::String(token_type.as_str().to_string()),
        }
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        ClaimValue::Text(value)
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::Text(value.to_string())
    }
}

impl From<DateTime<Utc>> for ClaimValue {
    fn from(value: DateTime<Utc>) -> Self {
        ClaimValue::Timestamp(value)
    }
}

impl From<TokenType> for ClaimValue {
    fn from(value: TokenType) -> Self {
        ClaimValue::TokenType(value)
    }
}

/// A key/value pair to embed in a token payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub key: String,
    pub value: ClaimValue,
}

impl Claim {
    pub fn new(key: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build a claim from loosely typed input such as a decoded request body.
    ///
    /// Strings become text and integers become Unix-second timestamps.
    /// Every other JSON shape is rejected.
    pub fn from_json(key: impl Into<String>, value: &Value) -> Result<Self, SigningError> {
        let key = key.into();
        let value = match value {
            Value::String(text) => ClaimValue::Text(text.clone()),
            Value::Number(number) => {
                let at = number
                    .as_i64()
                    .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                    .ok_or_else(|| SigningError::InvalidClaimType {
                        key: key.clone(),
                        found: format!("non-integer or out of range number {}", number),
                    })?;
                ClaimValue::Timestamp(at)
            }
            other => {
                return Err(SigningError::InvalidClaimType {
                    key,
                    found: json_kind(other).to_string(),
                })
            }
        };
        Ok(Self { key, value })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
