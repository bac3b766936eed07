//! Value codec for the namespace key-value store.
//!
//! The store infers a value's type from the literal bytes of the request body,
//! not from a content type. Dates and datetimes therefore travel unquoted,
//! valid JSON travels as-is, and any other string is JSON-quoted.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));
static DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}Z?$").expect("valid datetime pattern")
});

/// A KV value classified for transmission.
#[derive(Debug, Clone, PartialEq)]
pub enum KvValue {
    /// `YYYY-MM-DD`
    Date(String),
    /// `YYYY-MM-DD[T| ]HH:MM:SS[Z]`
    DateTime(String),
    /// JSON text, sent byte-for-byte.
    Json(String),
    /// A plain string that must be quoted on the wire.
    Text(String),
}

impl KvValue {
    /// Classify a caller value. Non-strings are serialized as JSON.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::from_text(s),
            other => Self::Json(other.to_string()),
        }
    }

    /// Classify a string by its literal content.
    pub fn from_text(raw: &str) -> Self {
        if DATE.is_match(raw) {
            Self::Date(raw.to_string())
        } else if DATETIME.is_match(raw) {
            Self::DateTime(raw.to_string())
        } else if serde_json::from_str::<Value>(raw).is_ok() {
            Self::Json(raw.to_string())
        } else {
            Self::Text(raw.to_string())
        }
    }

    /// Decode a stored body. Identical to [`KvValue::from_text`]: a body is
    /// classified the same way the store classified it.
    pub fn decode(body: &str) -> Self {
        Self::from_text(body)
    }

    /// The request body to send.
    pub fn encode(&self) -> String {
        match self {
            Self::Date(s) | Self::DateTime(s) | Self::Json(s) => s.clone(),
            Self::Text(s) => Value::String(s.clone()).to_string(),
        }
    }

    /// The value as JSON, for presenting a decoded body to callers.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Date(s) | Self::DateTime(s) | Self::Text(s) => Value::String(s.clone()),
            Self::Json(s) => serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Date(_) => "DATE",
            Self::DateTime(_) => "DATETIME",
            Self::Json(_) => "JSON",
            Self::Text(_) => "STRING",
        }
    }
}

/// Encode a caller value into the body sent to the store.
pub fn encode_kv_value(value: &Value) -> String {
    KvValue::from_value(value).encode()
}
