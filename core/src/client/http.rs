//! reqwest-backed [`Transport`].

use super::auth::Credentials;
use super::transport::{ApiRequest, ApiResponse, ApiScope, Method, RequestBody, Transport};
use super::urls::{compose_base_url, root_api_url};
use crate::error::{CoreError, CoreResult};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, warn};

/// Talks to a live engine over HTTP.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    tenant_base: String,
    root_base: String,
    tenant: Option<String>,
    credentials: Credentials,
}

impl HttpTransport {
    /// Create a transport rooted at `base_url` (normally `<host>/api/v1`).
    pub fn new(
        base_url: &str,
        tenant: Option<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> CoreResult<Self> {
        if base_url.trim().is_empty() {
            return Err(CoreError::InvalidConfiguration(
                "base URL must not be empty".to_string(),
            ));
        }
        let tenant = tenant.filter(|t| !t.trim().is_empty());
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            tenant_base: compose_base_url(base_url, tenant.as_deref()),
            root_base: root_api_url(base_url),
            tenant,
            credentials,
        })
    }

    /// Full URL for a request path.
    pub fn url_for(&self, request: &ApiRequest) -> String {
        let base = match request.scope {
            ApiScope::Tenant => &self.tenant_base,
            ApiScope::Root => &self.root_base,
        };
        if request.path.starts_with('/') {
            format!("{base}{}", request.path)
        } else {
            format!("{base}/{}", request.path)
        }
    }

    fn builder(&self, request: &ApiRequest, url: &str) -> reqwest::RequestBuilder {
        let builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };
        self.credentials.apply(builder, self.tenant.as_deref())
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("tenant_base", &self.tenant_base)
            .field("tenant", &self.tenant)
            .field("credentials", &self.credentials)
            .finish()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> CoreResult<ApiResponse> {
        let url = self.url_for(&request);
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self.builder(&request, &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Raw {
                content,
                content_type,
            } => builder
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(content),
            RequestBody::Multipart(fields) => {
                let form = fields
                    .into_iter()
                    .fold(Form::new(), |form, (name, value)| form.text(name, value));
                builder.multipart(form)
            }
            RequestBody::File { file_name, bytes } => {
                let part = Part::bytes(bytes).file_name(file_name);
                builder.multipart(Form::new().part("fileContent", part))
            }
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        if (200..300).contains(&status) {
            debug!(status, bytes = body.len(), "Received response");
        } else {
            warn!(status, url = %url, "Engine returned non-success status");
        }
        Ok(ApiResponse { status, body })
    }
}
