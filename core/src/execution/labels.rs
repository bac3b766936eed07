//! Execution labels and input normalization.
//!
//! Callers hand labels and inputs over in whichever shape they have at hand:
//! `"key:value"` strings, `{"key": .., "value": ..}` pairs, or a flat object.
//! Everything is normalized here before it reaches the wire.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A single execution label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub key: String,
    pub value: String,
}

impl Label {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parse a `key:value` string. The first colon separates key from value.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        match raw.split_once(':') {
            Some((key, value)) if !key.is_empty() => Ok(Self::new(key, value)),
            _ => Err(CoreError::InvalidArgument(format!(
                "label `{}` must be formatted as 'key:value'",
                raw
            ))),
        }
    }

    /// The `key:value` form the execution endpoint expects as a query parameter.
    pub fn to_query_value(&self) -> String {
        format!("{}:{}", self.key, self.value)
    }
}

/// Parse a JSON array of `"key:value"` strings and/or `{"key", "value"}` objects.
pub fn parse_labels(value: &Value) -> CoreResult<Vec<Label>> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        _ => {
            return Err(CoreError::InvalidArgument(
                "`labels` must be a list of 'key:value' strings or {key, value} objects"
                    .to_string(),
            ))
        }
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(raw) => Label::parse(raw),
            Value::Object(obj) => match (obj.get("key"), obj.get("value")) {
                (Some(Value::String(key)), Some(value)) => Ok(Label::new(key, form_value(value))),
                _ => Err(CoreError::InvalidArgument(
                    "`labels` must be a list of objects with 'key' and 'value' fields".to_string(),
                )),
            },
            other => Err(CoreError::InvalidArgument(format!(
                "unsupported label entry: {}",
                other
            ))),
        })
        .collect()
}

/// Merge `incoming` into `existing` by key. Incoming values win; existing order is kept
/// and new keys are appended in the order they arrive.
pub fn merge_labels(existing: &[Label], incoming: &[Label]) -> Vec<Label> {
    let mut merged: Vec<Label> = Vec::with_capacity(existing.len() + incoming.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for label in existing.iter().chain(incoming) {
        match index.get(&label.key) {
            Some(&pos) => merged[pos].value = label.value.clone(),
            None => {
                index.insert(label.key.clone(), merged.len());
                merged.push(label.clone());
            }
        }
    }
    merged
}

/// Flatten inputs given either as an object or as a list of `{"key", "value"}` pairs.
pub fn flatten_inputs(value: Value) -> CoreResult<Map<String, Value>> {
    match value {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(mut obj) => match (obj.remove("key"), obj.remove("value")) {
                    (Some(Value::String(key)), Some(value)) => Ok((key, value)),
                    _ => Err(CoreError::InvalidArgument(
                        "input pairs must have a string 'key' and a 'value'".to_string(),
                    )),
                },
                other => Err(CoreError::InvalidArgument(format!(
                    "unsupported input entry: {}",
                    other
                ))),
            })
            .collect(),
        other => Err(CoreError::InvalidArgument(format!(
            "`inputs` must be an object or a list of key/value pairs, got {}",
            other
        ))),
    }
}

/// Render a JSON value as a form field: strings verbatim, everything else as JSON text.
pub fn form_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
