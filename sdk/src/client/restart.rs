//! Restarting failed executions and overriding task-run states.

use crate::client::flowpilot_client::{require, FlowpilotClient};
use crate::error::{FlowpilotError, Result};
use flowpilot_core::client::ApiRequest;
use flowpilot_core::model::Execution;
use flowpilot_core::{ensure_restartable, ExecutionState};
use serde_json::json;
use tracing::info;

impl FlowpilotClient {
    /// Restart a FAILED execution.
    ///
    /// Without `execution_id`, the most recent FAILED execution of the flow is
    /// restarted. `revision` selects a flow revision other than the original.
    pub async fn restart(
        &self,
        namespace: &str,
        flow_id: &str,
        execution_id: Option<&str>,
        revision: Option<u32>,
    ) -> Result<Execution> {
        let execution = match execution_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => self.get_execution(id).await?,
            None => self
                .latest_execution(namespace, flow_id, Some(ExecutionState::Failed))
                .await?
                .ok_or_else(|| {
                    FlowpilotError::NotFound(format!(
                        "No failed executions found for {}/{}.",
                        namespace, flow_id
                    ))
                })?,
        };
        ensure_restartable(&execution.id, execution.current_state())?;

        let restarted: Execution = self
            .fetch_json(
                ApiRequest::post(format!("/executions/{}/restart", execution.id))
                    .query_opt("revision", revision.filter(|r| *r > 0)),
            )
            .await?;
        info!(execution_id = %execution.id, "Restarted execution");
        Ok(restarted)
    }

    /// Set the state of one task run, which restarts everything downstream of it.
    ///
    /// `state` defaults to SUCCESS. Without `task_run_id`, the first FAILED task
    /// run of the execution is targeted.
    pub async fn change_taskrun_state(
        &self,
        execution_id: &str,
        state: Option<ExecutionState>,
        task_run_id: Option<&str>,
    ) -> Result<Execution> {
        require("execution_id", execution_id)?;
        let state = state.unwrap_or(ExecutionState::Success);
        if !state.is_known() {
            return Err(FlowpilotError::InvalidArgument(format!(
                "Cannot set a task run to the `{}` state",
                state
            )));
        }

        let task_run_id = match task_run_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id.to_string(),
            None => self
                .get_execution(execution_id)
                .await?
                .first_failed_task_run()
                .map(|tr| tr.id.clone())
                .ok_or_else(|| {
                    FlowpilotError::NotFound(format!(
                        "No failed task runs found in execution `{}`",
                        execution_id
                    ))
                })?,
        };

        let updated: Execution = self
            .fetch_json(
                ApiRequest::post(format!("/executions/{}/state", execution_id))
                    .json(&json!({ "taskRunId": task_run_id, "state": state }))?,
            )
            .await?;
        info!(execution_id, task_run_id = %task_run_id, state = %state, "Changed task run state");
        Ok(updated)
    }
}
