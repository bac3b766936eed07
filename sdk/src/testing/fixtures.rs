//! JSON builders for engine entities.

use serde_json::{json, Value};

/// Builder for an execution as the engine returns it.
///
/// # Example
///
/// ```ignore
/// use flowpilot_sdk::testing::fixtures::ExecutionFixture;
///
/// let body = ExecutionFixture::new("e1", "FAILED")
///     .flow("company.team", "daily-etl")
///     .started_at("2024-01-03T00:00:00Z")
///     .label("team", "data")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionFixture {
    id: String,
    state: String,
    namespace: String,
    flow_id: String,
    start_date: Option<String>,
    labels: Vec<Value>,
    task_runs: Vec<Value>,
}

impl ExecutionFixture {
    pub fn new(id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: state.into(),
            namespace: "company.team".to_string(),
            flow_id: "flow".to_string(),
            start_date: None,
            labels: Vec::new(),
            task_runs: Vec::new(),
        }
    }

    pub fn flow(mut self, namespace: impl Into<String>, flow_id: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self.flow_id = flow_id.into();
        self
    }

    pub fn started_at(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.labels.push(json!({ "key": key, "value": value }));
        self
    }

    pub fn task_run(mut self, id: &str, task_id: &str, state: &str) -> Self {
        self.task_runs
            .push(json!({ "id": id, "taskId": task_id, "state": { "current": state } }));
        self
    }

    pub fn build(self) -> Value {
        let mut state = json!({ "current": self.state });
        if let Some(start) = self.start_date {
            state["startDate"] = Value::String(start);
        }
        json!({
            "id": self.id,
            "namespace": self.namespace,
            "flowId": self.flow_id,
            "state": state,
            "labels": self.labels,
            "taskRunList": self.task_runs,
        })
    }
}

/// Wrap items in the paged envelope list endpoints return.
pub fn paged(items: Vec<Value>) -> Value {
    let total = items.len();
    json!({ "results": items, "total": total })
}

/// A flow with the given triggers and tasks.
pub fn flow(namespace: &str, id: &str, triggers: Vec<Value>, tasks: Vec<Value>) -> Value {
    json!({
        "id": id,
        "namespace": namespace,
        "revision": 1,
        "triggers": triggers,
        "tasks": tasks,
    })
}

/// A schedule trigger.
pub fn schedule_trigger(id: &str, cron: &str) -> Value {
    json!({
        "id": id,
        "type": "io.kestra.plugin.core.trigger.Schedule",
        "cron": cron,
    })
}

/// A pause task declaring default resume fields.
pub fn pause_task(id: &str, defaults: &[(&str, Value)]) -> Value {
    let on_resume: Vec<Value> = defaults
        .iter()
        .map(|(field, default)| json!({ "id": field, "type": "STRING", "defaults": default }))
        .collect();
    json!({
        "id": id,
        "type": "io.kestra.plugin.core.flow.Pause",
        "onResume": on_resume,
    })
}
