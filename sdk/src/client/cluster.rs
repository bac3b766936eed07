//! Instance-wide endpoints that live outside the tenant prefix.

use crate::client::flowpilot_client::{require, FlowpilotClient};
use crate::error::{FlowpilotError, Result};
use flowpilot_core::client::ApiRequest;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

const WORKER_GROUPS_PATH: &str = "/cluster/workergroups";

/// Instance metadata categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InstanceInfo {
    #[default]
    Configuration,
    LicenseInfo,
    ActiveServices,
}

impl InstanceInfo {
    fn path(&self) -> &'static str {
        match self {
            Self::Configuration => "/configs",
            Self::LicenseInfo => "/license-info",
            Self::ActiveServices => "/cluster/services/active",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceAction {
    Enter,
    Exit,
}

impl MaintenanceAction {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
        }
    }
}

/// Definition of a worker group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerGroupSpec {
    pub key: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_tenants: Option<Vec<String>>,
}

impl WorkerGroupSpec {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            allowed_tenants: None,
        }
    }

    pub fn allowed_tenants(mut self, tenants: Vec<String>) -> Self {
        self.allowed_tenants = Some(tenants);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() || self.description.trim().is_empty() {
            return Err(FlowpilotError::MissingArgument(
                "worker groups require both `key` and `description`".to_string(),
            ));
        }
        Ok(())
    }
}

impl FlowpilotClient {
    /// Fetch instance metadata. A body that is not JSON is a serialization error.
    pub async fn instance_info(&self, info: InstanceInfo) -> Result<Value> {
        self.fetch_json(ApiRequest::get(info.path()).root_scoped())
            .await
    }

    pub async fn maintenance_mode(&self, action: MaintenanceAction) -> Result<Value> {
        let body = self
            .fetch_lenient(
                ApiRequest::post(format!("/cluster/maintenance/{}", action.as_str()))
                    .root_scoped(),
            )
            .await?;
        info!(action = action.as_str(), "Changed maintenance mode");
        Ok(body)
    }

    pub async fn list_worker_groups(&self) -> Result<Value> {
        self.fetch_lenient(ApiRequest::get(WORKER_GROUPS_PATH).root_scoped())
            .await
    }

    pub async fn get_worker_group(&self, id: &str) -> Result<Value> {
        require("id", id)?;
        self.fetch_lenient(ApiRequest::get(format!("{}/{}", WORKER_GROUPS_PATH, id)).root_scoped())
            .await
    }

    pub async fn create_worker_group(&self, spec: &WorkerGroupSpec) -> Result<Value> {
        spec.validate()?;
        let body = self
            .fetch_lenient(ApiRequest::post(WORKER_GROUPS_PATH).json(spec)?.root_scoped())
            .await?;
        info!(key = %spec.key, "Created worker group");
        Ok(body)
    }

    pub async fn update_worker_group(&self, id: &str, spec: &WorkerGroupSpec) -> Result<Value> {
        require("id", id)?;
        spec.validate()?;
        let body = self
            .fetch_lenient(
                ApiRequest::put(format!("{}/{}", WORKER_GROUPS_PATH, id))
                    .json(spec)?
                    .root_scoped(),
            )
            .await?;
        info!(id, key = %spec.key, "Updated worker group");
        Ok(body)
    }

    pub async fn delete_worker_group(&self, id: &str) -> Result<Value> {
        require("id", id)?;
        let body = self
            .fetch_lenient(
                ApiRequest::delete(format!("{}/{}", WORKER_GROUPS_PATH, id)).root_scoped(),
            )
            .await?;
        info!(id, "Deleted worker group");
        Ok(body)
    }
}
