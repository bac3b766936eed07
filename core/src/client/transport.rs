//! Request/response types and the transport seam.

use crate::error::{CoreError, CoreResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which base URL a path is resolved against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiScope {
    /// `<base>/api/v1[/<tenant>]`
    #[default]
    Tenant,
    /// `<base>/api/v1`, for instance-wide endpoints outside the tenant prefix.
    Root,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// Raw text with an explicit content type.
    Raw {
        content: String,
        content_type: String,
    },
    /// `multipart/form-data` text fields.
    Multipart(Vec<(String, String)>),
    /// `multipart/form-data` with a single `fileContent` part.
    File { file_name: String, bytes: Vec<u8> },
}

/// A request against the engine API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub scope: ApiScope,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            scope: ApiScope::Tenant,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter. Repeated keys are kept.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> CoreResult<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn raw(mut self, content: impl Into<String>, content_type: impl Into<String>) -> Self {
        self.body = RequestBody::Raw {
            content: content.into(),
            content_type: content_type.into(),
        };
        self
    }

    pub fn multipart(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }

    pub fn file(mut self, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.body = RequestBody::File {
            file_name: file_name.into(),
            bytes,
        };
        self
    }

    pub fn root_scoped(mut self) -> Self {
        self.scope = ApiScope::Root;
        self
    }

    /// First value of a query parameter.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A response with any status. Non-2xx is not an error at this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self::new(status, Vec::new())
    }

    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Map any non-2xx status to [`CoreError::Transport`].
    pub fn error_for_status(self) -> CoreResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(CoreError::Transport {
                status: self.status,
                body: self.text(),
            })
        }
    }

    pub fn parse<T: DeserializeOwned>(&self) -> CoreResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// JSON body, or an empty object when there is no body.
    pub fn json_or_empty(&self) -> CoreResult<Value> {
        if self.is_empty() {
            Ok(Value::Object(Map::new()))
        } else {
            self.parse()
        }
    }

    /// JSON body if it parses, otherwise the fallback.
    pub fn json_or(&self, fallback: Value) -> Value {
        if self.is_empty() {
            return fallback;
        }
        serde_json::from_slice(&self.body).unwrap_or(fallback)
    }
}

/// Sends requests to the engine.
///
/// Implementations return every HTTP status as an [`ApiResponse`] and fail only
/// on connection, TLS, or timeout problems. They perform no retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> CoreResult<ApiResponse>;
}
