//! Namespace listing and dependency graphs.

use crate::client::flowpilot_client::{require, FlowpilotClient};
use crate::error::{FlowpilotError, Result};
use flowpilot_core::client::ApiRequest;
use flowpilot_core::model::{DependencyGraph, Namespace};
use flowpilot_core::pagination::{page_items, PageWalker};
use flowpilot_core::render_dependencies;
use serde_json::Value;
use tracing::debug;

/// Context line appended to a namespace dependency graph
pub const NAMESPACE_DEPENDENCIES_CONTEXT: &str =
    "Flows listed without arrows have no dependencies within this namespace.";

impl FlowpilotClient {
    /// List namespaces matching an optional text query.
    ///
    /// Each entry reads `<id> (created)` or `<id> (not created)`. With
    /// `with_flows_only`, only namespaces holding flows are returned, as bare ids.
    pub async fn list_namespaces(
        &self,
        query: Option<&str>,
        page_size: Option<usize>,
        with_flows_only: bool,
    ) -> Result<Vec<String>> {
        if with_flows_only {
            return self.namespaces_with_flows().await;
        }

        let walker = PageWalker::new(page_size.unwrap_or(self.config.page_size))?;
        let query = query.filter(|q| !q.is_empty());
        let namespaces = walker
            .collect(|page, size| {
                let request = ApiRequest::get("/namespaces/search")
                    .query("page", page)
                    .query("size", size)
                    .query_opt("q", query);
                async move {
                    let body: Value = self.fetch_json(request).await?;
                    Ok::<_, FlowpilotError>(page_items::<Namespace>(body)?)
                }
            })
            .await?;
        debug!(count = namespaces.len(), "Listed namespaces");

        Ok(namespaces.iter().map(describe_namespace).collect())
    }

    /// Render the flow dependencies inside a namespace.
    pub async fn list_namespace_dependencies(&self, namespace: &str) -> Result<String> {
        require("namespace", namespace)?;
        let graph: DependencyGraph = self
            .fetch_json(ApiRequest::get(format!(
                "/namespaces/{}/dependencies",
                namespace
            )))
            .await?;
        Ok(render_dependencies(&graph, NAMESPACE_DEPENDENCIES_CONTEXT))
    }
}

fn describe_namespace(namespace: &Namespace) -> String {
    let status = if namespace.disabled {
        "not created"
    } else {
        "created"
    };
    format!("{} ({})", namespace.id, status)
}
