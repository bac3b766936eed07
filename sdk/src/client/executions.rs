//! Starting, inspecting, and controlling executions.

use crate::client::flowpilot_client::{require, FlowpilotClient};
use crate::error::{FlowpilotError, Result};
use chrono::{DateTime, Duration, Utc};
use flowpilot_core::client::ApiRequest;
use flowpilot_core::model::Execution;
use flowpilot_core::pagination::{finalize_descending, page_items, PageWalker};
use flowpilot_core::{
    ensure_flow_id_allowed, ensure_terminal, flatten_inputs, form_value, merge_labels,
    parse_labels, ExecutionState, KillOutcome, Label,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

/// Options for starting an execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecuteOptions {
    /// Flow revision to run; the latest when unset
    pub revision: Option<u32>,
    /// Block until the execution finishes
    pub wait: bool,
    /// Flat input mapping, sent as form fields
    pub inputs: Map<String, Value>,
    /// Labels attached to the new execution
    pub labels: Vec<Label>,
    /// ISO-8601 instant to schedule the execution for
    pub schedule_date: Option<String>,
}

impl ExecuteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_revision(mut self, revision: u32) -> Self {
        self.revision = Some(revision);
        self
    }

    pub fn with_wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    /// Replace the inputs from an object or a list of `{key, value}` pairs.
    pub fn with_inputs(mut self, inputs: Value) -> Result<Self> {
        self.inputs = flatten_inputs(inputs)?;
        Ok(self)
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push(Label::new(key, value));
        self
    }

    /// Replace the labels from `"key:value"` strings and/or `{key, value}` pairs.
    pub fn with_labels(mut self, labels: &Value) -> Result<Self> {
        self.labels = parse_labels(labels)?;
        Ok(self)
    }

    pub fn with_schedule_date(mut self, date: impl Into<String>) -> Self {
        self.schedule_date = Some(date.into());
        self
    }
}

/// An action on a single execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionAction {
    Pause,
    /// Kill the execution, and its subflows when `cascade` is set
    Kill { cascade: bool },
    Delete,
    Get,
    /// Force the execution into the named state
    ChangeStatus(String),
}

/// Result of a kill request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KillReport {
    pub execution_id: String,
    pub status: KillOutcome,
}

/// Result of [`FlowpilotClient::manage_execution`]
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionActionOutcome {
    Paused,
    Killed(KillReport),
    /// Engine body of the delete call, `{}` for no content
    Deleted(Value),
    Execution(Box<Execution>),
}

impl ExecutionActionOutcome {
    /// JSON rendering: `{"status": "paused"}` for a pause, the kill report,
    /// the delete body, or the execution itself.
    pub fn to_json(&self) -> Result<Value> {
        Ok(match self {
            Self::Paused => json!({ "status": "paused" }),
            Self::Killed(report) => serde_json::to_value(report)?,
            Self::Deleted(body) => body.clone(),
            Self::Execution(execution) => serde_json::to_value(execution)?,
        })
    }
}

/// Filters for [`FlowpilotClient::list_executions`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListExecutionsQuery {
    pub namespace: String,
    pub flow_id: Option<String>,
    /// Keep only the `count` most recent executions
    pub count: Option<usize>,
    /// Keep only executions started within the last `minutes`
    pub minutes: Option<u64>,
    /// Page size override; the client default when unset
    pub page_size: Option<usize>,
}

impl ListExecutionsQuery {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn flow_id(mut self, flow_id: impl Into<String>) -> Self {
        self.flow_id = Some(flow_id.into());
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn minutes(mut self, minutes: u64) -> Self {
        self.minutes = Some(minutes);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

impl FlowpilotClient {
    /// Start an execution of a flow.
    pub async fn execute(
        &self,
        namespace: &str,
        flow_id: &str,
        options: ExecuteOptions,
    ) -> Result<Execution> {
        require("namespace", namespace)?;
        require("flow_id", flow_id)?;
        ensure_flow_id_allowed(flow_id)?;

        let mut request = ApiRequest::post(format!("/executions/{}/{}", namespace, flow_id))
            .query_opt("revision", options.revision.filter(|r| *r > 0));
        if options.wait {
            request = request.query("wait", true);
        }
        for label in &options.labels {
            request = request.query("labels", label.to_query_value());
        }
        request = request.query_opt(
            "scheduleDate",
            options.schedule_date.as_deref().filter(|d| !d.is_empty()),
        );
        if !options.inputs.is_empty() {
            let fields = options
                .inputs
                .iter()
                .map(|(key, value)| (key.clone(), form_value(value)))
                .collect();
            request = request.multipart(fields);
        }

        let execution: Execution = self.fetch_json(request).await?;
        info!(
            execution_id = %execution.id,
            namespace,
            flow_id,
            "Started execution"
        );
        Ok(execution)
    }

    /// Apply an [`ExecutionAction`] to one execution.
    pub async fn manage_execution(
        &self,
        execution_id: &str,
        action: ExecutionAction,
    ) -> Result<ExecutionActionOutcome> {
        match action {
            ExecutionAction::Pause => {
                self.pause_execution(execution_id).await?;
                Ok(ExecutionActionOutcome::Paused)
            }
            ExecutionAction::Kill { cascade } => Ok(ExecutionActionOutcome::Killed(
                self.kill_execution(execution_id, cascade).await?,
            )),
            ExecutionAction::Delete => Ok(ExecutionActionOutcome::Deleted(
                self.delete_execution(execution_id).await?,
            )),
            ExecutionAction::Get => Ok(ExecutionActionOutcome::Execution(Box::new(
                self.get_execution(execution_id).await?,
            ))),
            ExecutionAction::ChangeStatus(status) => Ok(ExecutionActionOutcome::Execution(
                Box::new(self.change_execution_status(execution_id, &status).await?),
            )),
        }
    }

    pub async fn pause_execution(&self, execution_id: &str) -> Result<()> {
        require("execution_id", execution_id)?;
        self.send_ok(ApiRequest::post(format!("/executions/{}/pause", execution_id)))
            .await?;
        info!(execution_id, "Paused execution");
        Ok(())
    }

    /// Request a kill. 404 and 409 are reported as outcomes, not errors.
    pub async fn kill_execution(&self, execution_id: &str, cascade: bool) -> Result<KillReport> {
        require("execution_id", execution_id)?;
        let response = self
            .send(
                ApiRequest::delete(format!("/executions/{}/kill", execution_id))
                    .query("isOnKillCascade", cascade),
            )
            .await?;
        let status = KillOutcome::from_status(response.status);
        info!(execution_id, outcome = %status, "Kill requested");
        Ok(KillReport {
            execution_id: execution_id.to_string(),
            status,
        })
    }

    /// Delete an execution. No content counts as success.
    pub async fn delete_execution(&self, execution_id: &str) -> Result<Value> {
        require("execution_id", execution_id)?;
        let response = self
            .send(ApiRequest::delete(format!("/executions/{}", execution_id)))
            .await?;
        let body = if response.status == 204 {
            Value::Object(Map::new())
        } else {
            response.error_for_status()?.json_or_empty()?
        };
        info!(execution_id, "Deleted execution");
        Ok(body)
    }

    /// Force an execution into `status`, which must name a known state.
    pub async fn change_execution_status(
        &self,
        execution_id: &str,
        status: &str,
    ) -> Result<Execution> {
        require("execution_id", execution_id)?;
        if status.trim().is_empty() {
            return Err(FlowpilotError::MissingArgument(
                "`status` is required for change_status".to_string(),
            ));
        }
        let state: ExecutionState = status.parse()?;

        let execution: Execution = self
            .fetch_json(
                ApiRequest::post(format!("/executions/{}/change-status", execution_id))
                    .query("status", state),
            )
            .await?;
        info!(execution_id, status = %state, "Changed execution status");
        Ok(execution)
    }

    /// Add or overwrite labels on a finished execution.
    ///
    /// Existing labels are kept; an incoming label replaces the value of an
    /// existing one with the same key.
    pub async fn add_execution_labels(&self, execution_id: &str, labels: &[Label]) -> Result<Value> {
        let execution = self.get_execution(execution_id).await?;
        ensure_terminal(execution_id, execution.current_state())?;

        let merged = merge_labels(&execution.labels, labels);
        let response = self
            .send_ok(
                ApiRequest::post(format!("/executions/{}/labels", execution_id)).json(&merged)?,
            )
            .await?;
        info!(execution_id, labels = merged.len(), "Updated execution labels");
        Ok(response.json_or_empty()?)
    }

    /// List executions newest first.
    pub async fn list_executions(&self, query: ListExecutionsQuery) -> Result<Vec<Execution>> {
        require("namespace", &query.namespace)?;
        let walker = PageWalker::new(query.page_size.unwrap_or(self.config.page_size))?
            .with_limit(query.count);

        let namespace = query.namespace.as_str();
        let flow_id = query.flow_id.as_deref().filter(|f| !f.is_empty());
        let fetched = walker
            .collect(|page, size| {
                let request = ApiRequest::get("/executions")
                    .query("namespace", namespace)
                    .query("page", page)
                    .query("size", size)
                    .query_opt("flowId", flow_id);
                async move {
                    let body: Value = self.fetch_json(request).await?;
                    Ok::<_, FlowpilotError>(page_items::<Execution>(body)?)
                }
            })
            .await?;
        debug!(namespace, fetched = fetched.len(), "Fetched executions");

        let cutoff = query.minutes.map(|m| minutes_ago(Utc::now(), m));
        Ok(finalize_descending(
            fetched,
            |e| cutoff.map_or(true, |cutoff| e.start_date().is_some_and(|s| s >= cutoff)),
            |e| e.start_date(),
            query.count,
        ))
    }
}

fn minutes_ago(now: DateTime<Utc>, minutes: u64) -> DateTime<Utc> {
    i64::try_from(minutes)
        .ok()
        .and_then(Duration::try_minutes)
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
