//! Cursor walk over fixed-size, 1-based paged list endpoints.
//!
//! Pages are fetched strictly in order. The walk stops as soon as the
//! requested number of items is held, a short page comes back, or a page
//! is empty.

use crate::error::{CoreError, CoreResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cmp::Reverse;
use std::future::Future;
use tracing::debug;

/// Page size used when exactly one result is wanted.
pub const SINGLE_RESULT_PAGE_SIZE: usize = 10;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Sequential page walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWalker {
    page_size: usize,
    limit: Option<usize>,
}

impl PageWalker {
    pub fn new(page_size: usize) -> CoreResult<Self> {
        if page_size == 0 {
            return Err(CoreError::InvalidArgument(
                "page_size must be positive".to_string(),
            ));
        }
        Ok(Self {
            page_size,
            limit: None,
        })
    }

    /// Stop once `limit` items have been accumulated. A limit of one shrinks the
    /// page size; callers sort after collecting, so ordering is unaffected.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        if limit == Some(1) {
            self.page_size = SINGLE_RESULT_PAGE_SIZE;
        }
        self.limit = limit;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Walk pages starting at 1. `fetch` receives `(page, page_size)`.
    pub async fn collect<T, E, F, Fut>(&self, mut fetch: F) -> Result<Vec<T>, E>
    where
        F: FnMut(u32, usize) -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        let mut items: Vec<T> = Vec::new();
        let mut page: u32 = 1;

        loop {
            let batch = fetch(page, self.page_size).await?;
            let fetched = batch.len();
            debug!(page, fetched, page_size = self.page_size, "Fetched page");

            if fetched == 0 {
                break;
            }
            items.extend(batch);

            if self.limit.is_some_and(|limit| items.len() >= limit) {
                break;
            }
            if fetched < self.page_size {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

/// Keep the items accepted by `keep`, sort them descending by `key` (stable), and
/// truncate to `limit`.
pub fn finalize_descending<T, K, P, S>(
    items: Vec<T>,
    keep: P,
    key: S,
    limit: Option<usize>,
) -> Vec<T>
where
    K: Ord,
    P: Fn(&T) -> bool,
    S: Fn(&T) -> K,
{
    let mut kept: Vec<T> = items.into_iter().filter(|item| keep(item)).collect();
    kept.sort_by_key(|item| Reverse(key(item)));
    if let Some(limit) = limit {
        kept.truncate(limit);
    }
    kept
}

/// Extract the items of one page. List endpoints answer either with a bare array
/// or with an object holding `results` or `content`.
pub fn page_items<T: DeserializeOwned>(body: Value) -> CoreResult<Vec<T>> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("results").or_else(|| obj.remove("content")) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(CoreError::InvalidArgument(format!(
                    "expected a list of results, got {}",
                    other
                )))
            }
        },
        Value::Null => Vec::new(),
        other => {
            return Err(CoreError::InvalidArgument(format!(
                "expected a paged response, got {}",
                other
            )))
        }
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(CoreError::from))
        .collect()
}
