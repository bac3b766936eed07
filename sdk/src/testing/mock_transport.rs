//! Scripted transport for unit testing code built on the client.

use crate::client::FlowpilotClient;
use crate::config::FlowpilotClientConfig;
use crate::error::Result;
use async_trait::async_trait;
use flowpilot_core::client::{ApiRequest, ApiResponse, Method, Transport};
use flowpilot_core::CoreResult;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

/// Mock implementation of [`Transport`] that answers from scripted routes.
///
/// A route matches on method, path, and a subset of query parameters. When
/// several routes match, the one naming the most query parameters wins.
/// Responses queued on a route are served in order and the last one repeats.
/// Unmatched requests get a 404. Every request is recorded.
///
/// # Example
///
/// ```ignore
/// use flowpilot_sdk::testing::MockTransport;
///
/// let mock = MockTransport::new();
/// mock.on_json(Method::Get, "/executions/e1", 200, json!({ ... }));
///
/// let client = mock.client()?;
/// client.force_run("e1").await?;
///
/// assert_eq!(mock.requests_to(Method::Post, "/executions/e1/force-run").len(), 1);
/// ```
pub struct MockTransport {
    inner: Arc<MockTransportInner>,
}

struct MockTransportInner {
    routes: RwLock<Vec<Route>>,
    requests: RwLock<Vec<ApiRequest>>,
}

struct Route {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    responses: Vec<ApiResponse>,
    served: usize,
}

impl Route {
    fn matches(&self, request: &ApiRequest) -> bool {
        self.method == request.method
            && self.path == request.path
            && self.query.iter().all(|pair| request.query.contains(pair))
    }

    fn next_response(&mut self) -> ApiResponse {
        let idx = self.served.min(self.responses.len().saturating_sub(1));
        self.served += 1;
        self.responses
            .get(idx)
            .cloned()
            .unwrap_or_else(|| ApiResponse::empty(404))
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MockTransportInner {
                routes: RwLock::new(Vec::new()),
                requests: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Queue a response for `method path`.
    pub fn on(&self, method: Method, path: &str, response: ApiResponse) -> &Self {
        self.on_query(method, path, &[], response)
    }

    /// Queue a JSON response for `method path`.
    pub fn on_json(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.on(method, path, ApiResponse::json(status, &body))
    }

    /// Queue a response for requests carrying every listed query parameter.
    pub fn on_query(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        response: ApiResponse,
    ) -> &Self {
        let query: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut routes = self.inner.routes.write();
        match routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path && r.query == query)
        {
            Some(route) => route.responses.push(response),
            None => routes.push(Route {
                method,
                path: path.to_string(),
                query,
                responses: vec![response],
                served: 0,
            }),
        }
        self
    }

    /// Build a client that sends through this mock with the default configuration.
    pub fn client(&self) -> Result<FlowpilotClient> {
        self.client_with(FlowpilotClientConfig::default())
    }

    /// Build a client that sends through this mock.
    pub fn client_with(&self, config: FlowpilotClientConfig) -> Result<FlowpilotClient> {
        FlowpilotClient::builder()
            .config(config)
            .transport(Arc::new(self.clone()))
            .build()
    }

    /// Get all recorded requests.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.inner.requests.read().clone()
    }

    /// Get recorded requests to one method and path.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.inner
            .requests
            .read()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    /// Check if any request was sent to `method path`.
    pub fn was_called(&self, method: Method, path: &str) -> bool {
        self.inner
            .requests
            .read()
            .iter()
            .any(|r| r.method == method && r.path == path)
    }

    pub fn request_count(&self) -> usize {
        self.inner.requests.read().len()
    }

    /// Clear all recorded requests. Routes are kept.
    pub fn clear_recordings(&self) {
        self.inner.requests.write().clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> CoreResult<ApiResponse> {
        self.inner.requests.write().push(request.clone());

        let mut routes = self.inner.routes.write();
        let response = routes
            .iter_mut()
            .filter(|route| route.matches(&request))
            .max_by_key(|route| route.query.len())
            .map(Route::next_response)
            .unwrap_or_else(|| {
                ApiResponse::new(
                    404,
                    format!("no mock route for {} {}", request.method, request.path),
                )
            });
        Ok(response)
    }
}
