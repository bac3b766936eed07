//! Replaying past executions.

use crate::client::flowpilot_client::FlowpilotClient;
use crate::error::{FlowpilotError, Result};
use flowpilot_core::client::ApiRequest;
use flowpilot_core::ExecutionTarget;
use serde_json::Value;
use tracing::info;

/// Result of a replay submission
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayResult {
    /// Executions submitted for replay
    pub execution_ids: Vec<String>,
    /// Engine response to the bulk replay call
    pub response: Value,
}

impl FlowpilotClient {
    /// Replay executions by id, or the latest execution of a flow in any state.
    pub async fn replay(&self, target: ExecutionTarget, latest_revision: bool) -> Result<ReplayResult> {
        target.ensure_non_empty()?;
        let execution_ids = match target {
            ExecutionTarget::Ids(ids) => ids,
            ExecutionTarget::LatestOf { namespace, flow_id } => {
                let latest = self
                    .latest_execution(&namespace, &flow_id, None)
                    .await?
                    .ok_or_else(|| {
                        FlowpilotError::NotFound(format!(
                            "No executions found for {}/{}.",
                            namespace, flow_id
                        ))
                    })?;
                vec![latest.id]
            }
        };

        let mut request = ApiRequest::post("/executions/replay/by-ids").json(&execution_ids)?;
        if latest_revision {
            request = request.query("latestRevision", true);
        }
        let response = self.send_ok(request).await?.json_or_empty()?;
        info!(
            executions = ?execution_ids,
            latest_revision,
            "Submitted replay"
        );
        Ok(ReplayResult {
            execution_ids,
            response,
        })
    }
}
