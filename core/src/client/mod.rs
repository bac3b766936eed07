//! HTTP transport for the orchestration engine's REST API.
//!
//! The [`Transport`] trait is the seam between operations and the network:
//! [`HttpTransport`] talks to a real engine, test doubles script answers.

mod auth;
mod http;
mod transport;
mod urls;

pub use auth::{Credentials, TENANT_HEADER};
pub use http::HttpTransport;
pub use transport::{ApiRequest, ApiResponse, ApiScope, Method, RequestBody, Transport};
pub use urls::{compose_base_url, root_api_url};
