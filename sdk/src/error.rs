//! Error types for the Flowpilot SDK

// Re-export core error types
pub use flowpilot_core::CoreError;

use flowpilot_core::ExecutionState;

/// Main error type for the Flowpilot SDK
#[derive(Debug, thiserror::Error)]
pub enum FlowpilotError {
    /// A caller-supplied value is malformed or out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A required argument was not supplied
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// The execution's current state does not permit the requested operation
    #[error(
        "Execution `{execution_id}` is in state `{current}`; allowed states: {}",
        join_states(allowed)
    )]
    InvalidStateTransition {
        execution_id: String,
        current: String,
        allowed: Vec<ExecutionState>,
    },

    /// The requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Labels may only be mutated once an execution has finished
    #[error(
        "Cannot add labels to execution `{execution_id}` because its current state is `{current}`; \
         labels may only be added when execution is in one of: {}",
        join_states(ExecutionState::TERMINAL)
    )]
    TerminalStateRequired {
        execution_id: String,
        current: String,
    },

    /// The flow id collides with a fixed API route segment
    #[error("The flow ID `{flow_id}` is reserved and cannot be used")]
    ReservedIdentifier { flow_id: String },

    /// Unmapped non-success response from the engine
    #[error("Engine returned HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    /// Connection, TLS, or timeout failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A flow definition is not valid YAML
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type alias for Flowpilot SDK operations
pub type Result<T> = std::result::Result<T, FlowpilotError>;

fn join_states(states: &[ExecutionState]) -> String {
    let mut names: Vec<&str> = states.iter().map(ExecutionState::as_str).collect();
    names.sort_unstable();
    names.join(", ")
}

impl FlowpilotError {
    /// HTTP status of an unmapped engine response, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FlowpilotError::Transport { status, .. } => Some(*status),
            FlowpilotError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<CoreError> for FlowpilotError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidArgument(msg) => FlowpilotError::InvalidArgument(msg),
            CoreError::MissingArgument(msg) => FlowpilotError::MissingArgument(msg),
            CoreError::InvalidStateTransition {
                execution_id,
                current,
                allowed,
            } => FlowpilotError::InvalidStateTransition {
                execution_id,
                current,
                allowed,
            },
            CoreError::NotFound(msg) => FlowpilotError::NotFound(msg),
            CoreError::TerminalStateRequired {
                execution_id,
                current,
            } => FlowpilotError::TerminalStateRequired {
                execution_id,
                current,
            },
            CoreError::ReservedIdentifier { flow_id } => {
                FlowpilotError::ReservedIdentifier { flow_id }
            }
            CoreError::Transport { status, body } => FlowpilotError::Transport { status, body },
            CoreError::Http(e) => FlowpilotError::Http(e),
            CoreError::Serialization(e) => FlowpilotError::Serialization(e),
            CoreError::InvalidConfiguration(msg) => FlowpilotError::InvalidConfiguration(msg),
        }
    }
}
