//! Wire model for the engine's JSON representations.
//!
//! Each type keeps the fields flowpilot reasons about and carries everything
//! else through `extra`, so a value re-serializes to what the engine sent.

use crate::execution::{ExecutionState, Label};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One run instance of a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub id: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub flow_id: String,
    pub state: ExecutionStateInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub labels: Vec<Label>,
    #[serde(
        default,
        alias = "taskRuns",
        alias = "tasks",
        deserialize_with = "nullable_vec"
    )]
    pub task_run_list: Vec<TaskRun>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Execution {
    pub fn current_state(&self) -> ExecutionState {
        self.state.current
    }

    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.state.start_date
    }

    /// First task run whose state is FAILED, in task-run order.
    pub fn first_failed_task_run(&self) -> Option<&TaskRun> {
        self.task_run_list
            .iter()
            .find(|tr| tr.current_state() == Some(ExecutionState::Failed))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStateInfo {
    pub current: ExecutionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A task run inside an execution. The engine reports its state either as a bare
/// string or as a `{ "current": .. }` object depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRun {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<TaskRunState>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskRun {
    pub fn current_state(&self) -> Option<ExecutionState> {
        match self.state.as_ref()? {
            TaskRunState::Plain(s) => s.parse().ok(),
            TaskRunState::Nested { current, .. } => current.parse().ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskRunState {
    Plain(String),
    Nested {
        current: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

/// A named, versioned workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u32>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub triggers: Vec<Trigger>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub tasks: Vec<FlowTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Flow {
    /// First trigger whose type names a schedule.
    pub fn schedule_trigger(&self) -> Option<&Trigger> {
        self.triggers.iter().find(|t| t.is_schedule())
    }

    /// Default resume fields declared by the first pause task that has `onResume`.
    pub fn pause_defaults(&self) -> Map<String, Value> {
        self.tasks
            .iter()
            .find(|task| task.kind.ends_with("Pause") && task.on_resume.is_some())
            .and_then(|task| task.on_resume.as_ref())
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|f| Some((f.id.clone(), f.defaults.clone()?)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Trigger {
    pub fn is_schedule(&self) -> bool {
        self.kind.ends_with("Schedule")
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowTask {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_resume: Option<Vec<ResumeField>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeField {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Flow dependency graph as returned by the dependency endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyGraph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl GraphNode {
    pub fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.uid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub relation: Relation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relation {
    FlowTrigger,
    #[default]
    FlowTask,
    /// Unknown relations render like subflow-task dependencies.
    #[serde(other)]
    Other,
}

/// Key metadata returned by the KV listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KvEntry {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Namespace summary from the namespace search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub id: String,
    #[serde(default)]
    pub disabled: bool,
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
