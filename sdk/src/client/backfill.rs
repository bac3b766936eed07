//! Backfilling a scheduled flow over a past time window.

use crate::client::flowpilot_client::{require, FlowpilotClient};
use crate::error::{FlowpilotError, Result};
use flowpilot_core::client::ApiRequest;
use flowpilot_core::{Label, TimeWindow, WindowSpec};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

/// A backfill submission
#[derive(Debug, Clone, PartialEq)]
pub struct BackfillRequest {
    pub namespace: String,
    pub flow_id: String,
    pub window: WindowSpec,
    /// Trigger to backfill; the flow's schedule trigger when unset
    pub trigger_id: Option<String>,
    pub inputs: Map<String, Value>,
    pub labels: Vec<Label>,
}

impl BackfillRequest {
    pub fn new(namespace: impl Into<String>, flow_id: impl Into<String>, window: WindowSpec) -> Self {
        Self {
            namespace: namespace.into(),
            flow_id: flow_id.into(),
            window,
            trigger_id: None,
            inputs: Map::new(),
            labels: Vec::new(),
        }
    }

    pub fn trigger_id(mut self, trigger_id: impl Into<String>) -> Self {
        self.trigger_id = Some(trigger_id.into());
        self
    }

    pub fn inputs(mut self, inputs: Map<String, Value>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn labels(mut self, labels: Vec<Label>) -> Self {
        self.labels = labels;
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TriggerBackfill<'a> {
    namespace: &'a str,
    flow_id: &'a str,
    trigger_id: &'a str,
    backfill: BackfillWindow<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tenant_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct BackfillWindow<'a> {
    start: &'a str,
    end: Option<&'a str>,
    inputs: &'a Map<String, Value>,
    labels: &'a [Label],
}

impl FlowpilotClient {
    /// Submit a backfill for a flow's trigger.
    ///
    /// The window is resolved before any request is made.
    pub async fn backfill(&self, request: BackfillRequest) -> Result<Value> {
        require("namespace", &request.namespace)?;
        require("flow_id", &request.flow_id)?;
        let window: TimeWindow = request.window.resolve()?;

        let trigger_id = match request.trigger_id.filter(|t| !t.trim().is_empty()) {
            Some(trigger_id) => trigger_id,
            None => self
                .get_flow(&request.namespace, &request.flow_id)
                .await?
                .schedule_trigger()
                .map(|t| t.id.clone())
                .ok_or_else(|| {
                    FlowpilotError::NotFound(format!(
                        "No Schedule trigger found in {}/{}",
                        request.namespace, request.flow_id
                    ))
                })?,
        };

        let payload = TriggerBackfill {
            namespace: &request.namespace,
            flow_id: &request.flow_id,
            trigger_id: &trigger_id,
            backfill: BackfillWindow {
                start: &window.start,
                end: window.end.as_deref(),
                inputs: &request.inputs,
                labels: &request.labels,
            },
            tenant_id: self.config.tenant_id.as_deref(),
        };
        let response = self
            .send_ok(ApiRequest::put("/triggers").json(&payload)?)
            .await?;
        info!(
            namespace = %request.namespace,
            flow_id = %request.flow_id,
            trigger_id = %trigger_id,
            start = %window.start,
            end = ?window.end,
            "Submitted backfill"
        );
        Ok(response.json_or_empty()?)
    }
}
