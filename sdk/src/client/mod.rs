//! Client for driving the orchestration engine

pub mod admin;
pub mod backfill;
pub mod builder;
pub mod cluster;
pub mod executions;
pub mod files;
pub mod flowpilot_client;
pub mod flows;
pub mod kv;
pub mod namespaces;
pub mod replay;
pub mod restart;
pub mod resume;

// Re-export transport types from core
pub use flowpilot_core::client::{
    ApiRequest, ApiResponse, ApiScope, Credentials, HttpTransport, Method, RequestBody, Transport,
    TENANT_HEADER,
};

// Re-export high-level client types
pub use admin::{
    Announcement, AnnouncementAction, AnnouncementType, AppAction, AppSearch, GroupAction,
    IamRole, InvitationAction, TestAction, UserInvite, UserSearch, UserType,
};
pub use backfill::BackfillRequest;
pub use builder::FlowpilotClientBuilder;
pub use cluster::{InstanceInfo, MaintenanceAction, WorkerGroupSpec};
pub use executions::{
    ExecuteOptions, ExecutionAction, ExecutionActionOutcome, KillReport, ListExecutionsQuery,
};
pub use files::{EntryKind, MoveOutcome};
pub use flowpilot_client::{select_latest, FlowpilotClient};
pub use flows::{FlowAction, TriggerFilter, FLOW_DEPENDENCIES_CONTEXT};
pub use namespaces::NAMESPACE_DEPENDENCIES_CONTEXT;
pub use replay::ReplayResult;
pub use resume::ResumeOutcome;
