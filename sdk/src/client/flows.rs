//! Flow search, upsert, and lifecycle management.

use crate::client::flowpilot_client::{require, FlowpilotClient};
use crate::error::{FlowpilotError, Result};
use flowpilot_core::client::ApiRequest;
use flowpilot_core::model::{DependencyGraph, Flow, Trigger};
use flowpilot_core::{ensure_flow_id_allowed, render_dependencies};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

pub(crate) const YAML_CONTENT_TYPE: &str = "application/x-yaml";

/// Context line appended to a single flow's dependency graph
pub const FLOW_DEPENDENCIES_CONTEXT: &str =
    "Flows listed without arrows have no dependencies within this flow.";

/// Which triggers [`FlowpilotClient::list_flows_with_triggers`] keeps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerFilter {
    #[default]
    All,
    EnabledOnly,
    DisabledOnly,
}

impl TriggerFilter {
    fn accepts(&self, trigger: &Trigger) -> bool {
        match self {
            Self::All => true,
            Self::EnabledOnly => trigger.is_enabled(),
            Self::DisabledOnly => !trigger.is_enabled(),
        }
    }
}

/// An action on a single flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    Enable,
    Disable,
    ListRevisions,
    ListDependencies,
    GetYaml,
    Delete,
}

impl FlowpilotClient {
    /// Fetch a flow definition.
    pub async fn get_flow(&self, namespace: &str, flow_id: &str) -> Result<Flow> {
        require("namespace", namespace)?;
        require("flow_id", flow_id)?;
        self.fetch_json(ApiRequest::get(format!("/flows/{}/{}", namespace, flow_id)))
            .await
    }

    /// Full-text search over flow ids and sources.
    pub async fn search_flows(&self, query: &str, size: usize, page: u32) -> Result<Value> {
        self.fetch_json(
            ApiRequest::get("/flows/search")
                .query("query", query)
                .query("size", size)
                .query("page", page),
        )
        .await
    }

    /// Every namespace that holds at least one flow.
    pub async fn namespaces_with_flows(&self) -> Result<Vec<String>> {
        self.fetch_json(ApiRequest::get("/flows/distinct-namespaces"))
            .await
    }

    /// Flows in a namespace.
    pub async fn list_flows_in_namespace(&self, namespace: &str) -> Result<Vec<Flow>> {
        require("namespace", namespace)?;
        self.fetch_json(ApiRequest::get(format!("/flows/{}", namespace)))
            .await
    }

    /// Describe every flow that has at least one trigger passing `filter`.
    ///
    /// One markdown block per flow, listing each trigger's id, status, type,
    /// and YAML definition. All namespaces are scanned when `namespace` is
    /// `None`.
    pub async fn list_flows_with_triggers(
        &self,
        namespace: Option<&str>,
        filter: TriggerFilter,
    ) -> Result<Vec<String>> {
        let namespaces = match namespace.filter(|ns| !ns.is_empty()) {
            Some(ns) => vec![ns.to_string()],
            None => self.namespaces_with_flows().await?,
        };

        let mut blocks = Vec::new();
        for ns in &namespaces {
            for flow in self.list_flows_in_namespace(ns).await? {
                let triggers: Vec<&Trigger> =
                    flow.triggers.iter().filter(|t| filter.accepts(t)).collect();
                if triggers.is_empty() {
                    continue;
                }
                blocks.push(describe_triggers(&flow.id, ns, &triggers)?);
            }
        }
        debug!(namespaces = namespaces.len(), flows = blocks.len(), "Listed triggered flows");
        Ok(blocks)
    }

    /// Create a flow from its YAML source, updating it when it already exists.
    pub async fn create_flow_from_yaml(&self, yaml: &str) -> Result<Value> {
        let doc: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let field = |name: &str| {
            doc.get(name)
                .and_then(serde_yaml::Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let (namespace, flow_id) = match (field("namespace"), field("id")) {
            (Some(ns), Some(id)) => (ns, id),
            _ => {
                return Err(FlowpilotError::InvalidArgument(
                    "YAML must include 'namespace' and 'id' fields".to_string(),
                ))
            }
        };
        ensure_flow_id_allowed(&flow_id)?;

        let created = self
            .send(ApiRequest::post("/flows").raw(yaml, YAML_CONTENT_TYPE))
            .await?;
        let response = match created.status {
            409 | 422 => {
                warn!(
                    namespace = %namespace,
                    flow_id = %flow_id,
                    status = created.status,
                    "Flow exists, updating instead"
                );
                self.send_ok(
                    ApiRequest::put(format!("/flows/{}/{}", namespace, flow_id))
                        .raw(yaml, YAML_CONTENT_TYPE),
                )
                .await?
            }
            _ => created.error_for_status()?,
        };
        info!(namespace = %namespace, flow_id = %flow_id, "Saved flow");
        Ok(response.json_or_empty()?)
    }

    /// Apply a [`FlowAction`] to one flow.
    ///
    /// Dependency graphs and YAML sources come back as JSON strings; a flow
    /// without a stored source yields `null`.
    pub async fn manage_flow(
        &self,
        namespace: &str,
        flow_id: &str,
        action: FlowAction,
    ) -> Result<Value> {
        require("namespace", namespace)?;
        require("flow_id", flow_id)?;
        match action {
            FlowAction::Enable => self.set_flow_enabled(namespace, flow_id, true).await,
            FlowAction::Disable => self.set_flow_enabled(namespace, flow_id, false).await,
            FlowAction::ListRevisions => {
                self.fetch_json(ApiRequest::get(format!(
                    "/flows/{}/{}/revisions",
                    namespace, flow_id
                )))
                .await
            }
            FlowAction::ListDependencies => Ok(Value::String(
                self.flow_dependencies(namespace, flow_id).await?,
            )),
            FlowAction::GetYaml => Ok(self
                .flow_yaml(namespace, flow_id)
                .await?
                .map_or(Value::Null, Value::String)),
            FlowAction::Delete => self.delete_flow(namespace, flow_id).await,
        }
    }

    async fn set_flow_enabled(&self, namespace: &str, flow_id: &str, enabled: bool) -> Result<Value> {
        let verb = if enabled { "enable" } else { "disable" };
        let body = self
            .send_ok(
                ApiRequest::post(format!("/flows/{}/by-ids", verb))
                    .json(&json!([{ "namespace": namespace, "id": flow_id }]))?,
            )
            .await?
            .json_or_empty()?;
        info!(namespace, flow_id, enabled, "Changed flow status");
        Ok(body)
    }

    /// Render a flow's dependency graph.
    pub async fn flow_dependencies(&self, namespace: &str, flow_id: &str) -> Result<String> {
        let graph: DependencyGraph = self
            .fetch_json(ApiRequest::get(format!(
                "/flows/{}/{}/dependencies",
                namespace, flow_id
            )))
            .await?;
        Ok(render_dependencies(&graph, FLOW_DEPENDENCIES_CONTEXT))
    }

    /// The stored YAML source of a flow.
    pub async fn flow_yaml(&self, namespace: &str, flow_id: &str) -> Result<Option<String>> {
        let flow: Flow = self
            .fetch_json(
                ApiRequest::get(format!("/flows/{}/{}", namespace, flow_id))
                    .query("source", true),
            )
            .await?;
        Ok(flow.source)
    }

    /// Delete a flow. 200 and 204 both count as success.
    pub async fn delete_flow(&self, namespace: &str, flow_id: &str) -> Result<Value> {
        let body = self
            .fetch_lenient(ApiRequest::delete(format!("/flows/{}/{}", namespace, flow_id)))
            .await?;
        info!(namespace, flow_id, "Deleted flow");
        Ok(body)
    }

    /// Ask the engine's assistant to write or revise a flow. Returns the raw
    /// YAML text.
    pub async fn generate_flow(&self, prompt: &str, existing_yaml: Option<&str>) -> Result<String> {
        require("prompt", prompt)?;
        let response = self
            .send_ok(ApiRequest::post("/ai/generate/flow").json(&json!({
                "userPrompt": prompt,
                "flowYaml": existing_yaml.unwrap_or_default(),
            }))?)
            .await?;
        Ok(response.text())
    }
}

fn describe_triggers(flow_id: &str, namespace: &str, triggers: &[&Trigger]) -> Result<String> {
    let mut lines = vec![format!(
        "Flow `{}` in namespace `{}` with triggers:",
        flow_id, namespace
    )];
    for trigger in triggers {
        let status = if trigger.is_enabled() { "enabled" } else { "disabled" };
        let definition = serde_yaml::to_string(trigger)?;
        lines.push(format!(
            "- `{}` ({}) of type `{}` defined as:\n```yaml\n{}\n```",
            trigger.id,
            status,
            trigger.kind,
            definition.trim_end()
        ));
    }
    Ok(lines.join("\n"))
}
