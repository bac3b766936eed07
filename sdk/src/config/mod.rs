//! Configuration presets for Flowpilot client
//!
//! Connection settings for the engine API, with sensible defaults and
//! environment-variable loading.

use flowpilot_core::client::Credentials;
use flowpilot_core::pagination::DEFAULT_PAGE_SIZE;
use std::time::Duration;

/// Environment variable holding the API base URL
pub const ENV_BASE_URL: &str = "FLOWPILOT_BASE_URL";
/// Environment variable holding the tenant id
pub const ENV_TENANT_ID: &str = "FLOWPILOT_TENANT_ID";
/// Environment variable holding the basic-auth username
pub const ENV_USERNAME: &str = "FLOWPILOT_USERNAME";
/// Environment variable holding the basic-auth password
pub const ENV_PASSWORD: &str = "FLOWPILOT_PASSWORD";
/// Environment variable holding a bearer token
pub const ENV_API_TOKEN: &str = "FLOWPILOT_API_TOKEN";
/// Environment variable holding the request timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "FLOWPILOT_TIMEOUT_SECS";

/// Complete configuration for FlowpilotClient
#[derive(Debug, Clone, PartialEq)]
pub struct FlowpilotClientConfig {
    /// API root, normally `<host>/api/v1`
    pub base_url: String,
    /// Tenant appended to the base URL and sent as a header
    pub tenant_id: Option<String>,
    /// Pre-obtained credentials
    pub credentials: Credentials,
    /// Per-request timeout
    pub timeout: Duration,
    /// Page size for paginated listings
    pub page_size: usize,
}

impl Default for FlowpilotClientConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            tenant_id: None,
            credentials: Credentials::None,
            timeout: Self::DEFAULT_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FlowpilotClientConfig {
    /// Base URL of a local engine
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8080/api/v1";

    /// Default request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new configuration with validation
    pub fn new(
        base_url: impl Into<String>,
        tenant_id: Option<String>,
        credentials: Credentials,
        timeout: Duration,
        page_size: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            base_url: base_url.into(),
            tenant_id,
            credentials,
            timeout,
            page_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from `FLOWPILOT_*` environment variables, falling back to defaults.
    ///
    /// Basic credentials take precedence over a bearer token when both are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_BASE_URL) {
            config.base_url = url;
        }
        config.tenant_id = get(ENV_TENANT_ID);
        config.credentials = match (get(ENV_USERNAME), get(ENV_PASSWORD), get(ENV_API_TOKEN)) {
            (Some(user), Some(password), _) => Credentials::basic(user, password),
            (_, _, Some(token)) => Credentials::bearer(token),
            _ => Credentials::None,
        };
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ConfigError::InvalidValue(format!(
                    "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got `{raw}`"
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::InvalidValue(
                "base_url must not be empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(format!(
                "base_url must start with http:// or https://, got `{url}`"
            )));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "timeout must be positive".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue(
                "page_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the tenant
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Set credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the listing page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Configuration error
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<ConfigError> for crate::error::FlowpilotError {
    fn from(err: ConfigError) -> Self {
        crate::error::FlowpilotError::InvalidConfiguration(err.to_string())
    }
}
