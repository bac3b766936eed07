//! Namespace key-value store.

use crate::client::flowpilot_client::{require, FlowpilotClient};
use crate::error::{FlowpilotError, Result};
use flowpilot_core::client::ApiRequest;
use flowpilot_core::model::KvEntry;
use flowpilot_core::pagination::page_items;
use flowpilot_core::KvValue;
use serde_json::Value;
use tracing::info;

fn kv_path(namespace: &str, key: &str) -> String {
    format!("/namespaces/{}/kv/{}", namespace, key)
}

impl FlowpilotClient {
    /// The stored value for `key`, as the engine returns it.
    pub async fn kv_get(&self, namespace: &str, key: &str) -> Result<Value> {
        require("namespace", namespace)?;
        require("key", key)?;
        self.fetch_json(ApiRequest::get(kv_path(namespace, key)))
            .await
    }

    /// Store a value. Strings are typed by their content; see [`KvValue`].
    pub async fn kv_set(&self, namespace: &str, key: &str, value: &Value) -> Result<()> {
        require("namespace", namespace)?;
        require("key", key)?;
        let encoded = KvValue::from_value(value);
        self.send_ok(
            ApiRequest::put(kv_path(namespace, key)).raw(encoded.encode(), "application/json"),
        )
        .await?;
        info!(namespace, key, kind = encoded.type_name(), "Stored KV entry");
        Ok(())
    }

    /// Key metadata for every entry in a namespace.
    pub async fn kv_list(&self, namespace: &str) -> Result<Vec<KvEntry>> {
        require("namespace", namespace)?;
        let body: Value = self
            .fetch_json(ApiRequest::get(format!("/namespaces/{}/kv", namespace)))
            .await?;
        Ok(page_items(body)?)
    }

    /// Delete a key. Returns the engine's response body, if any.
    pub async fn kv_delete(&self, namespace: &str, key: &str) -> Result<Option<Value>> {
        require("namespace", namespace)?;
        require("key", key)?;
        let response = self.send(ApiRequest::delete(kv_path(namespace, key))).await?;
        if response.status == 404 {
            return Err(FlowpilotError::NotFound(format!(
                "Key '{}' not found in namespace '{}'.",
                key, namespace
            )));
        }
        let response = response.error_for_status()?;
        info!(namespace, key, "Deleted KV entry");
        if response.is_empty() {
            Ok(None)
        } else {
            Ok(Some(response.parse()?))
        }
    }
}
