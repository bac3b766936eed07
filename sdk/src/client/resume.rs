//! Resuming paused executions and forcing queued ones to run.

use crate::client::flowpilot_client::FlowpilotClient;
use crate::error::{FlowpilotError, Result};
use flowpilot_core::client::{ApiRequest, ApiResponse};
use flowpilot_core::model::Execution;
use flowpilot_core::{ensure_force_runnable, form_value, ExecutionState, ExecutionTarget};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Result of [`FlowpilotClient::resume`]
#[derive(Debug, Clone, PartialEq)]
pub enum ResumeOutcome {
    /// Response of the bulk resume endpoint
    Bulk(Value),
    /// Per-execution responses, `{}` for no content
    PerExecution(BTreeMap<String, Value>),
}

impl FlowpilotClient {
    /// Resume paused executions.
    ///
    /// - Ids without `on_resume` fields use the bulk resume endpoint.
    /// - Ids with fields resume each execution in turn, sending the fields as a
    ///   form.
    /// - Without ids, the most recent PAUSED execution of the flow is resumed.
    ///   When no fields are given, the defaults declared by the flow's pause
    ///   task are sent instead.
    pub async fn resume(
        &self,
        target: ExecutionTarget,
        on_resume: Option<Map<String, Value>>,
    ) -> Result<ResumeOutcome> {
        target.ensure_non_empty()?;
        let fields = on_resume.unwrap_or_default();
        match target {
            ExecutionTarget::Ids(ids) if fields.is_empty() => {
                let body = self
                    .send_ok(ApiRequest::post("/executions/resume/by-ids").json(&ids)?)
                    .await?
                    .json_or_empty()?;
                info!(executions = ?ids, "Resumed executions in bulk");
                Ok(ResumeOutcome::Bulk(body))
            }
            ExecutionTarget::Ids(ids) => {
                let mut results = BTreeMap::new();
                for id in ids {
                    let body = self.resume_one(&id, &fields).await?;
                    results.insert(id, body);
                }
                Ok(ResumeOutcome::PerExecution(results))
            }
            ExecutionTarget::LatestOf { namespace, flow_id } => {
                let latest = self
                    .latest_execution(&namespace, &flow_id, Some(ExecutionState::Paused))
                    .await?
                    .ok_or_else(|| {
                        FlowpilotError::NotFound(format!(
                            "No paused executions found for {}/{}.",
                            namespace, flow_id
                        ))
                    })?;
                let fields = if fields.is_empty() {
                    let defaults = self.get_flow(&namespace, &flow_id).await?.pause_defaults();
                    debug!(
                        namespace = %namespace,
                        flow_id = %flow_id,
                        defaults = defaults.len(),
                        "Using pause task defaults"
                    );
                    defaults
                } else {
                    fields
                };
                let body = self.resume_one(&latest.id, &fields).await?;
                Ok(ResumeOutcome::PerExecution(BTreeMap::from([(latest.id, body)])))
            }
        }
    }

    async fn resume_one(&self, execution_id: &str, fields: &Map<String, Value>) -> Result<Value> {
        let mut request = ApiRequest::post(format!("/executions/{}/resume", execution_id));
        if !fields.is_empty() {
            request = request.multipart(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), form_value(value)))
                    .collect(),
            );
        }
        let response = self.send(request).await?;
        info!(execution_id, status = response.status, "Resumed execution");
        no_content_or_json(response)
    }

    /// Force a CREATED, PAUSED, or QUEUED execution to run now.
    pub async fn force_run(&self, execution_id: &str) -> Result<Execution> {
        let execution = self.get_execution(execution_id).await?;
        ensure_force_runnable(execution_id, execution.current_state())?;

        let forced: Execution = self
            .fetch_json(ApiRequest::post(format!(
                "/executions/{}/force-run",
                execution_id
            )))
            .await?;
        info!(execution_id, "Force-ran execution");
        Ok(forced)
    }
}

fn no_content_or_json(response: ApiResponse) -> Result<Value> {
    if response.status == 204 {
        return Ok(Value::Object(Map::new()));
    }
    Ok(response.error_for_status()?.json_or_empty()?)
}
