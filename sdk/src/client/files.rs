//! Namespace file and directory operations.

use crate::client::flowpilot_client::{require, FlowpilotClient};
use crate::error::{FlowpilotError, Result};
use flowpilot_core::client::ApiRequest;
use serde_json::{json, Value};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Result of moving a file or directory
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The engine's response, or a status object when it sent no body
    Moved(Value),
    /// The path being moved does not exist
    SourceMissing {
        kind: EntryKind,
        namespace: String,
        path: String,
    },
    /// The directory the destination would live in does not exist
    DestinationParentMissing {
        kind: EntryKind,
        namespace: String,
        parent: String,
    },
    /// The engine answered 404 and neither probe explains why
    NotFound,
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved(_))
    }
}

impl fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moved(body) => write!(f, "{}", body),
            Self::SourceMissing {
                kind,
                namespace,
                path,
            } => write!(
                f,
                "Error: The source {} '{}' does not exist in namespace '{}'.",
                kind.as_str(),
                path,
                namespace
            ),
            Self::DestinationParentMissing {
                kind,
                namespace,
                parent,
            } => write!(
                f,
                "Error: The {} '{}' does not exist in namespace '{}'. Please create it first.",
                kind.destination_label(),
                parent,
                namespace
            ),
            Self::NotFound => f.write_str(
                "Error: Move failed with 404 Not Found. Please check your paths and try again.",
            ),
        }
    }
}

/// Whether a namespace entry is a file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }

    fn destination_label(&self) -> &'static str {
        match self {
            Self::File => "destination directory",
            Self::Directory => "destination parent directory",
        }
    }

    fn probe_path(&self, namespace: &str) -> String {
        match self {
            Self::File => files_path(namespace),
            Self::Directory => format!("{}/directory", files_path(namespace)),
        }
    }

    fn moved_status(&self) -> &'static str {
        match self {
            Self::File => "moved",
            Self::Directory => "directory_moved",
        }
    }
}

fn files_path(namespace: &str) -> String {
    format!("/namespaces/{}/files", namespace)
}

fn parent_dir(path: &str) -> Option<String> {
    Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|p| !p.is_empty())
}

impl FlowpilotClient {
    /// Raw contents of a namespace file.
    pub async fn get_file(&self, namespace: &str, path: &str) -> Result<Vec<u8>> {
        require("namespace", namespace)?;
        require("path", path)?;
        let response = self
            .send_ok(ApiRequest::get(files_path(namespace)).query("path", path))
            .await?;
        Ok(response.body)
    }

    /// Upload a file, replacing any existing content at `path`.
    pub async fn create_file(&self, namespace: &str, path: &str, content: Vec<u8>) -> Result<Value> {
        require("namespace", namespace)?;
        require("path", path)?;
        let response = self
            .send_ok(
                ApiRequest::post(files_path(namespace))
                    .query("path", path)
                    .file(path, content),
            )
            .await?;
        info!(namespace, path, "Created namespace file");
        Ok(response.json_or(json!({ "status": "created" })))
    }

    pub async fn delete_file(&self, namespace: &str, path: &str) -> Result<Value> {
        require("namespace", namespace)?;
        require("path", path)?;
        let response = self
            .send_ok(ApiRequest::delete(files_path(namespace)).query("path", path))
            .await?;
        info!(namespace, path, "Deleted namespace file");
        Ok(response.json_or(json!({ "status": "deleted" })))
    }

    /// Search file paths in a namespace.
    pub async fn search_files(&self, namespace: &str, q: &str) -> Result<Value> {
        require("namespace", namespace)?;
        require("q", q)?;
        self.fetch_json(
            ApiRequest::get(format!("{}/search", files_path(namespace))).query("q", q),
        )
        .await
    }

    pub async fn move_file(&self, namespace: &str, from: &str, to: &str) -> Result<MoveOutcome> {
        self.move_entry(EntryKind::File, namespace, from, to).await
    }

    /// List a directory, or the namespace root when `path` is `None`.
    pub async fn list_directory(&self, namespace: &str, path: Option<&str>) -> Result<Value> {
        require("namespace", namespace)?;
        self.fetch_json(
            ApiRequest::get(EntryKind::Directory.probe_path(namespace))
                .query_opt("path", path.filter(|p| !p.is_empty())),
        )
        .await
    }

    pub async fn create_directory(&self, namespace: &str, path: &str) -> Result<Value> {
        require("namespace", namespace)?;
        require("path", path)?;
        let response = self
            .send_ok(
                ApiRequest::post(EntryKind::Directory.probe_path(namespace)).query("path", path),
            )
            .await?;
        info!(namespace, path, "Created namespace directory");
        Ok(response.json_or(json!({ "status": "directory_created" })))
    }

    /// Delete a directory and its contents. A missing directory is `NotFound`.
    pub async fn delete_directory(&self, namespace: &str, path: &str) -> Result<Value> {
        require("namespace", namespace)?;
        require("path", path)?;
        let response = self
            .send(ApiRequest::delete(files_path(namespace)).query("path", path))
            .await?;
        if response.status == 404 {
            return Err(FlowpilotError::NotFound(format!(
                "The directory '{}' does not exist in namespace '{}'.",
                path, namespace
            )));
        }
        let response = response.error_for_status()?;
        info!(namespace, path, "Deleted namespace directory");
        Ok(response.json_or(json!({ "status": "directory_deleted" })))
    }

    pub async fn move_directory(&self, namespace: &str, from: &str, to: &str) -> Result<MoveOutcome> {
        self.move_entry(EntryKind::Directory, namespace, from, to).await
    }

    async fn move_entry(
        &self,
        kind: EntryKind,
        namespace: &str,
        from: &str,
        to: &str,
    ) -> Result<MoveOutcome> {
        require("namespace", namespace)?;
        require("path", from)?;
        require("to_path", to)?;

        let response = self
            .send(
                ApiRequest::put(files_path(namespace))
                    .query("from", from)
                    .query("to", to),
            )
            .await?;
        if response.status != 404 {
            let response = response.error_for_status()?;
            info!(namespace, from, to, "Moved namespace entry");
            return Ok(MoveOutcome::Moved(
                response.json_or(json!({ "status": kind.moved_status() })),
            ));
        }

        warn!(namespace, from, to, "Move returned 404, probing paths");
        let source = self
            .send(ApiRequest::get(kind.probe_path(namespace)).query("path", from))
            .await?;
        if source.status == 404 {
            return Ok(MoveOutcome::SourceMissing {
                kind,
                namespace: namespace.to_string(),
                path: from.to_string(),
            });
        }

        if let Some(parent) = parent_dir(to) {
            let destination = self
                .send(
                    ApiRequest::get(EntryKind::Directory.probe_path(namespace))
                        .query("path", &parent),
                )
                .await?;
            if destination.status == 404 {
                return Ok(MoveOutcome::DestinationParentMissing {
                    kind,
                    namespace: namespace.to_string(),
                    parent,
                });
            }
        }

        Ok(MoveOutcome::NotFound)
    }
}
