//! Status-code tables for operations whose non-2xx answers are expected outcomes.

use serde::{Serialize, Serializer};
use std::fmt;

/// Result of asking the engine to kill an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillOutcome {
    KillRequested,
    NotFound,
    AlreadyFinished,
    /// Any status the table does not name.
    Unexpected(u16),
}

/// Engine status code to kill outcome. Codes missing here map to [`KillOutcome::Unexpected`].
pub const KILL_STATUS_OUTCOMES: &[(u16, KillOutcome)] = &[
    (202, KillOutcome::KillRequested),
    (404, KillOutcome::NotFound),
    (409, KillOutcome::AlreadyFinished),
];

impl KillOutcome {
    pub fn from_status(status: u16) -> Self {
        KILL_STATUS_OUTCOMES
            .iter()
            .find(|(code, _)| *code == status)
            .map(|(_, outcome)| *outcome)
            .unwrap_or(KillOutcome::Unexpected(status))
    }
}

impl fmt::Display for KillOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KillRequested => f.write_str("kill_requested"),
            Self::NotFound => f.write_str("not_found"),
            Self::AlreadyFinished => f.write_str("already_finished"),
            Self::Unexpected(status) => write!(f, "error_{}", status),
        }
    }
}

impl Serialize for KillOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
