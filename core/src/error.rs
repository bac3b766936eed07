//! Core error types for the flowpilot orchestration client
//!
//! Validation failures are raised locally, before any request leaves the
//! process. Remote failures surface as [`CoreError::Transport`] unless an
//! operation defines a narrower mapping.

use crate::execution::ExecutionState;

/// Core error type shared by every flowpilot crate
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A caller-supplied value is malformed or out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A required argument was not supplied
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// The execution's current state does not permit the requested operation
    #[error(
        "Execution `{execution_id}` is in state `{current}`; allowed states: {}",
        format_states(allowed)
    )]
    InvalidStateTransition {
        execution_id: String,
        current: String,
        allowed: Vec<ExecutionState>,
    },

    /// The requested entity does not exist on the engine
    #[error("Not found: {0}")]
    NotFound(String),

    /// Labels may only be mutated on executions that reached a terminal state
    #[error(
        "Cannot add labels to execution `{execution_id}` because its current state is `{current}`; \
         labels may only be added when execution is in one of: {}",
        format_states(ExecutionState::TERMINAL)
    )]
    TerminalStateRequired {
        execution_id: String,
        current: String,
    },

    /// The flow id collides with a fixed API route segment
    #[error("The flow ID `{flow_id}` is reserved and cannot be used")]
    ReservedIdentifier { flow_id: String },

    /// The engine answered with a non-success status that no operation maps
    #[error("Engine returned HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    /// Connection, TLS, or timeout failure below the HTTP layer
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type alias for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

pub(crate) fn format_states(states: &[ExecutionState]) -> String {
    let mut names: Vec<&str> = states.iter().map(|s| s.as_str()).collect();
    names.sort_unstable();
    names.join(", ")
}
