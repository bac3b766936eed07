//! Execution state model, label handling, and per-operation outcome tables.

mod labels;
mod outcome;
mod state;
mod target;

pub use labels::{flatten_inputs, form_value, merge_labels, parse_labels, Label};
pub use outcome::{KillOutcome, KILL_STATUS_OUTCOMES};
pub use state::{
    ensure_flow_id_allowed, ensure_force_runnable, ensure_restartable, ensure_terminal,
    ExecutionState, RESERVED_FLOW_IDS,
};
pub use target::ExecutionTarget;
