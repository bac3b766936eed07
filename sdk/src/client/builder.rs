//! FlowpilotClient builder for fluent configuration

use crate::config::FlowpilotClientConfig;
use crate::error::Result;
use flowpilot_core::client::{Credentials, HttpTransport, Transport};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Builder for creating FlowpilotClient instances
///
/// Example:
/// ```ignore
/// let client = FlowpilotClient::builder()
///     .base_url("https://kestra.example.com/api/v1")
///     .tenant_id("main")
///     .basic_auth("admin", "secret")
///     .build()?;
/// ```
pub struct FlowpilotClientBuilder {
    config: FlowpilotClientConfig,
    custom_transport: Option<Arc<dyn Transport>>,
}

impl Default for FlowpilotClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowpilotClientBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: FlowpilotClientConfig::default(),
            custom_transport: None,
        }
    }

    /// Set the API base URL, normally `<host>/api/v1`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the tenant ID
    pub fn tenant_id(mut self, id: impl Into<String>) -> Self {
        self.config.tenant_id = Some(id.into());
        self
    }

    /// Authenticate with HTTP basic auth
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Credentials::basic(username, password);
        self
    }

    /// Authenticate with a bearer token
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.config.credentials = Credentials::bearer(token);
        self
    }

    /// Set the per-request timeout
    ///
    /// Default: 30 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the page size used by paginated listings
    ///
    /// Default: 100
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size;
        self
    }

    /// Set the complete client configuration
    pub fn config(mut self, config: FlowpilotClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set a custom transport
    ///
    /// When set, the URL, credential, and timeout settings are not used to
    /// build an HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.custom_transport = Some(transport);
        self
    }

    /// Build the FlowpilotClient
    pub fn build(self) -> Result<super::FlowpilotClient> {
        self.config.validate()?;

        let transport: Arc<dyn Transport> = match self.custom_transport {
            Some(transport) => transport,
            None => {
                debug!(
                    base_url = %self.config.base_url,
                    tenant = ?self.config.tenant_id,
                    "Creating HTTP transport"
                );
                Arc::new(HttpTransport::new(
                    &self.config.base_url,
                    self.config.tenant_id.clone(),
                    self.config.credentials.clone(),
                    self.config.timeout,
                )?)
            }
        };

        Ok(super::FlowpilotClient {
            transport,
            config: self.config,
        })
    }
}
