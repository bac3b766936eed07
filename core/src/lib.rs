//! # Flowpilot Core
//!
//! Transport-agnostic building blocks for driving a workflow-orchestration
//! engine over its REST API.
//!
//! ## What's in Core vs SDK
//!
//! **Core** contains the pieces that need no client state:
//! - Execution state model, guards, and label handling
//! - Time-window resolution for backfills
//! - Pagination walking and result finalization
//! - KV value typing
//! - Dependency graph rendering
//! - The [`client::Transport`] seam and its reqwest implementation
//!
//! **SDK** contains the client facade:
//! - `FlowpilotClient` and its builder
//! - Configuration presets and environment loading
//! - Every engine operation (executions, flows, namespaces, files, KV, cluster)
//! - Testing utilities
//!
//! ## Modules
//!
//! - [`client`] - HTTP transport, credentials, and request types
//! - [`execution`] - Execution states, labels, targets, and kill outcomes
//! - [`model`] - Engine entities decoded from API responses
//! - [`pagination`] - Page walking and descending finalization
//! - [`window`] - Backfill time windows
//! - [`kv`] - KV value type inference and encoding
//! - [`graph`] - Text rendering of flow dependency graphs
//! - [`error`] - Core error types

pub mod client;
pub mod error;
pub mod execution;
pub mod graph;
pub mod kv;
pub mod model;
pub mod pagination;
pub mod window;

// Re-export error types
pub use error::{CoreError, CoreResult};

// Re-export execution types
pub use execution::{
    ensure_flow_id_allowed, ensure_force_runnable, ensure_restartable, ensure_terminal,
    flatten_inputs, form_value, merge_labels, parse_labels, ExecutionState, ExecutionTarget,
    KillOutcome, Label, KILL_STATUS_OUTCOMES, RESERVED_FLOW_IDS,
};

// Re-export client types
pub use client::{
    ApiRequest, ApiResponse, ApiScope, Credentials, HttpTransport, Method, RequestBody, Transport,
};

pub use graph::render_dependencies;
pub use kv::{encode_kv_value, KvValue};
pub use model::{
    DependencyGraph, Execution, ExecutionStateInfo, Flow, FlowTask, GraphEdge, GraphNode,
    KvEntry, Namespace, Relation, ResumeField, TaskRun, TaskRunState, Trigger,
};
pub use pagination::{finalize_descending, page_items, PageWalker};
pub use window::{format_utc, TimeWindow, WindowSpec};
