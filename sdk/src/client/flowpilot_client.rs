//! FlowpilotClient - Main entry point for the Flowpilot SDK
//!
//! The FlowpilotClient exposes the engine's operations as typed async methods.
//! Each method issues a short, strictly sequential series of requests through
//! the configured [`Transport`] and performs no retries.

use crate::client::builder::FlowpilotClientBuilder;
use crate::config::FlowpilotClientConfig;
use crate::error::{FlowpilotError, Result};
use flowpilot_core::client::{ApiRequest, ApiResponse, Transport};
use flowpilot_core::model::Execution;
use flowpilot_core::pagination::page_items;
use flowpilot_core::ExecutionState;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Main client for driving the orchestration engine
#[derive(Clone)]
pub struct FlowpilotClient {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) config: FlowpilotClientConfig,
}

impl std::fmt::Debug for FlowpilotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowpilotClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FlowpilotClient {
    /// Create a new builder
    pub fn builder() -> FlowpilotClientBuilder {
        FlowpilotClientBuilder::new()
    }

    /// Build a client from `FLOWPILOT_*` environment variables
    pub fn from_env() -> Result<Self> {
        let config = FlowpilotClientConfig::from_env()?;
        Self::builder().config(config).build()
    }

    /// The active configuration
    pub fn config(&self) -> &FlowpilotClientConfig {
        &self.config
    }

    /// Send a request and return the response whatever its status.
    pub(crate) async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        Ok(self.transport.send(request).await?)
    }

    /// Send a request and fail on any non-2xx status.
    pub(crate) async fn send_ok(&self, request: ApiRequest) -> Result<ApiResponse> {
        Ok(self.send(request).await?.error_for_status()?)
    }

    /// Send a request and decode a successful JSON body.
    pub(crate) async fn fetch_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        Ok(self.send_ok(request).await?.parse()?)
    }

    /// Send a request whose success body may be empty.
    ///
    /// 200 and 204 decode to the body's JSON, or `{}` when the body is empty or
    /// not JSON. Other statuses fail.
    pub(crate) async fn fetch_lenient(&self, request: ApiRequest) -> Result<Value> {
        let response = self.send(request).await?;
        match response.status {
            200 | 204 => Ok(response.json_or(Value::Object(Map::new()))),
            _ => Ok(response.error_for_status()?.json_or_empty()?),
        }
    }

    /// Fetch a single execution.
    pub async fn get_execution(&self, execution_id: &str) -> Result<Execution> {
        require("execution_id", execution_id)?;
        self.fetch_json(ApiRequest::get(format!("/executions/{}", execution_id)))
            .await
    }

    /// Most recent execution of a flow, optionally restricted to one state.
    ///
    /// Returns `Ok(None)` when nothing matches; callers decide whether that is
    /// an error.
    pub async fn latest_execution(
        &self,
        namespace: &str,
        flow_id: &str,
        state: Option<ExecutionState>,
    ) -> Result<Option<Execution>> {
        require("namespace", namespace)?;
        require("flow_id", flow_id)?;

        let request = ApiRequest::get("/executions")
            .query("namespace", namespace)
            .query("flowId", flow_id)
            .query("size", self.config.page_size)
            .query("sort", "state.startDate,desc")
            .query_opt("state", state);
        let body: Value = self.fetch_json(request).await?;
        let executions: Vec<Execution> = page_items(body)?;
        debug!(
            namespace,
            flow_id,
            fetched = executions.len(),
            "Resolving latest execution"
        );
        Ok(select_latest(executions, state))
    }
}

/// Pick the execution with the greatest start date, after an optional state
/// filter.
///
/// Executions without a start date rank below every dated one. Identical
/// start dates resolve to the lexicographically greatest execution id.
pub fn select_latest(
    executions: Vec<Execution>,
    state: Option<ExecutionState>,
) -> Option<Execution> {
    executions
        .into_iter()
        .filter(|e| state.map_or(true, |s| e.current_state() == s))
        .max_by(|a, b| {
            a.start_date()
                .cmp(&b.start_date())
                .then_with(|| a.id.cmp(&b.id))
        })
}

/// Fail with `MissingArgument` when a required string is blank.
pub(crate) fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(FlowpilotError::MissingArgument(format!("`{}` is required", name)))
    } else {
        Ok(())
    }
}
