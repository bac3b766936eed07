//! Flowpilot SDK for Rust
//!
//! This SDK drives a remote workflow-orchestration engine over its REST API:
//! starting and controlling executions, backfilling schedules, managing
//! flows, namespace files, and key-value state.

#![allow(clippy::result_large_err)]

pub mod client;
pub mod config;
pub mod error;

/// Testing utilities for code built on the client.
/// Available only with the `testing` feature enabled.
#[cfg(feature = "testing")]
pub mod testing;

// Re-export commonly used types
pub use error::{FlowpilotError, Result};

// Re-export config types
pub use config::{ConfigError, FlowpilotClientConfig};

// Re-export client types
pub use client::{
    Announcement, AnnouncementAction, AnnouncementType, AppAction, AppSearch, BackfillRequest,
    EntryKind, ExecuteOptions, ExecutionAction, ExecutionActionOutcome, FlowAction,
    FlowpilotClient, FlowpilotClientBuilder, GroupAction, IamRole, InstanceInfo, InvitationAction,
    KillReport, ListExecutionsQuery, MaintenanceAction, MoveOutcome, ReplayResult, ResumeOutcome,
    TestAction, TriggerFilter, UserInvite, UserSearch, UserType, WorkerGroupSpec,
};

// Re-export core types used in the client's signatures
pub use flowpilot_core::{
    Credentials, Execution, ExecutionState, ExecutionTarget, Flow, KillOutcome, KvEntry, KvValue,
    Label, WindowSpec,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::{
        Announcement, AnnouncementAction, AnnouncementType, AppAction, AppSearch,
        BackfillRequest, EntryKind, ExecuteOptions, ExecutionAction, ExecutionActionOutcome,
        FlowAction, FlowpilotClient, FlowpilotClientBuilder, GroupAction, IamRole, InstanceInfo,
        InvitationAction, KillReport, ListExecutionsQuery, MaintenanceAction, MoveOutcome,
        ReplayResult, ResumeOutcome, TestAction, TriggerFilter, UserInvite, UserSearch, UserType,
        WorkerGroupSpec,
    };
    pub use crate::config::{ConfigError, FlowpilotClientConfig};
    pub use crate::error::{FlowpilotError, Result};
    pub use flowpilot_core::{
        Credentials, Execution, ExecutionState, ExecutionTarget, Flow, KillOutcome, KvEntry,
        KvValue, Label, WindowSpec,
    };
    pub use serde_json::{json, Map, Value};
}
