//! Execution states and the legality rules for state-changing operations.

use crate::error::{format_states, CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every state an execution can be in on the engine.
///
/// States this client does not know deserialize as [`ExecutionState::Unknown`],
/// which belongs to no allowed set and cannot be parsed from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionState {
    Created,
    Running,
    Paused,
    Restarted,
    Killing,
    Success,
    Warning,
    Failed,
    Killed,
    Cancelled,
    Queued,
    Retrying,
    Retried,
    Skipped,
    #[serde(other)]
    Unknown,
}

impl ExecutionState {
    /// All known states, in declaration order. Excludes [`ExecutionState::Unknown`].
    pub const ALL: &'static [ExecutionState] = &[
        Self::Created,
        Self::Running,
        Self::Paused,
        Self::Restarted,
        Self::Killing,
        Self::Success,
        Self::Warning,
        Self::Failed,
        Self::Killed,
        Self::Cancelled,
        Self::Queued,
        Self::Retrying,
        Self::Retried,
        Self::Skipped,
    ];

    /// States with no further outgoing transition. Only these accept label mutation.
    pub const TERMINAL: &'static [ExecutionState] = &[
        Self::Success,
        Self::Warning,
        Self::Failed,
        Self::Killed,
        Self::Cancelled,
        Self::Skipped,
    ];

    /// States from which an execution may be force-run.
    pub const FORCE_RUNNABLE: &'static [ExecutionState] =
        &[Self::Created, Self::Paused, Self::Queued];

    /// States from which an execution may be restarted.
    pub const RESTARTABLE: &'static [ExecutionState] = &[Self::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
            Self::Restarted => "RESTARTED",
            Self::Killing => "KILLING",
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Failed => "FAILED",
            Self::Killed => "KILLED",
            Self::Cancelled => "CANCELLED",
            Self::Queued => "QUEUED",
            Self::Retrying => "RETRYING",
            Self::Retried => "RETRIED",
            Self::Skipped => "SKIPPED",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn is_terminal(&self) -> bool {
        Self::TERMINAL.contains(self)
    }

    pub fn is_force_runnable(&self) -> bool {
        Self::FORCE_RUNNABLE.contains(self)
    }

    pub fn is_restartable(&self) -> bool {
        Self::RESTARTABLE.contains(self)
    }

    pub fn is_known(&self) -> bool {
        *self != Self::Unknown
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| {
                CoreError::InvalidArgument(format!(
                    "Invalid status `{}`. Must be one of: {}",
                    s,
                    format_states(Self::ALL)
                ))
            })
    }
}

/// Flow ids that collide with fixed route segments under `/executions` and `/flows`.
pub const RESERVED_FLOW_IDS: &[&str] = &[
    "pause",
    "resume",
    "force-run",
    "change-status",
    "kill",
    "executions",
    "search",
    "source",
    "disable",
    "enable",
];

/// Reject flow ids that would be routed as API verbs instead of flows.
pub fn ensure_flow_id_allowed(flow_id: &str) -> CoreResult<()> {
    if RESERVED_FLOW_IDS.contains(&flow_id) {
        return Err(CoreError::ReservedIdentifier {
            flow_id: flow_id.to_string(),
        });
    }
    Ok(())
}

/// Label mutation requires a terminal state.
pub fn ensure_terminal(execution_id: &str, current: ExecutionState) -> CoreResult<()> {
    if current.is_terminal() {
        Ok(())
    } else {
        Err(CoreError::TerminalStateRequired {
            execution_id: execution_id.to_string(),
            current: current.to_string(),
        })
    }
}

pub fn ensure_restartable(execution_id: &str, current: ExecutionState) -> CoreResult<()> {
    ensure_in(execution_id, current, ExecutionState::RESTARTABLE)
}

pub fn ensure_force_runnable(execution_id: &str, current: ExecutionState) -> CoreResult<()> {
    ensure_in(execution_id, current, ExecutionState::FORCE_RUNNABLE)
}

fn ensure_in(
    execution_id: &str,
    current: ExecutionState,
    allowed: &[ExecutionState],
) -> CoreResult<()> {
    if allowed.contains(&current) {
        Ok(())
    } else {
        Err(CoreError::InvalidStateTransition {
            execution_id: execution_id.to_string(),
            current: current.to_string(),
            allowed: allowed.to_vec(),
        })
    }
}
