//! Credential attachment for outgoing requests.
//!
//! Credentials are obtained elsewhere; this module only attaches them.

use reqwest::RequestBuilder;
use tracing::debug;

/// Header naming the tenant on multi-tenant engines.
pub const TENANT_HEADER: &str = "X-Kestra-Tenant";

/// Pre-obtained credentials.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    /// Unauthenticated engine.
    #[default]
    None,
    /// HTTP basic auth.
    Basic { username: String, password: String },
    /// `Authorization: Bearer <token>`.
    Bearer(String),
}

impl Credentials {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Attach these credentials, and the tenant header if any, to a request.
    pub fn apply(&self, request: RequestBuilder, tenant: Option<&str>) -> RequestBuilder {
        let request = match self {
            Self::None => request,
            Self::Basic { username, password } => request.basic_auth(username, Some(password)),
            Self::Bearer(token) => request.bearer_auth(token),
        };
        match tenant {
            Some(tenant) => {
                debug!(tenant, "Attached tenant header");
                request.header(TENANT_HEADER, tenant)
            }
            None => request,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
        }
    }
}
