//! Selection of the executions an operation applies to.

use crate::error::{CoreError, CoreResult};

/// Either an explicit list of execution ids, or "the latest execution of this flow".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionTarget {
    Ids(Vec<String>),
    LatestOf { namespace: String, flow_id: String },
}

impl ExecutionTarget {
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Ids(ids.into_iter().map(Into::into).collect())
    }

    pub fn latest_of(namespace: impl Into<String>, flow_id: impl Into<String>) -> Self {
        Self::LatestOf {
            namespace: namespace.into(),
            flow_id: flow_id.into(),
        }
    }

    /// Reject an id list with nothing in it.
    pub fn ensure_non_empty(&self) -> CoreResult<()> {
        match self {
            Self::Ids(ids) if ids.is_empty() => Err(CoreError::MissingArgument(
                "at least one execution id is required".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Build a target from loosely-supplied parts. Non-empty ids win; otherwise both
    /// namespace and flow id are required.
    pub fn from_parts(
        ids: Option<Vec<String>>,
        namespace: Option<String>,
        flow_id: Option<String>,
    ) -> CoreResult<Self> {
        match ids {
            Some(ids) if !ids.is_empty() => Ok(Self::Ids(ids)),
            _ => match (namespace, flow_id) {
                (Some(ns), Some(flow)) if !ns.is_empty() && !flow.is_empty() => {
                    Ok(Self::latest_of(ns, flow))
                }
                _ => Err(CoreError::MissingArgument(
                    "if ids are not provided, both namespace and flow_id are required".to_string(),
                )),
            },
        }
    }
}
