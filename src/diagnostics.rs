/// Best-effort diagnostic log of every request and response
///
/// Each entry is appended to a plain text file with its own
/// open-write-close cycle. Failures are reported on stderr and never reach
/// the protocol.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};

#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    path: Option<PathBuf>,
}

impl DiagnosticLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// A log that drops every entry
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Record a free-form lifecycle message
    pub async fn note(&self, message: &str) {
        self.append(message.to_string()).await;
    }

    pub async fn request(&self, request: &JsonRpcRequest) {
        self.append(format_request(request)).await;
    }

    pub async fn response(&self, response: &JsonRpcResponse) {
        self.append(format_response(response)).await;
    }

    async fn append(&self, body: String) {
        let Some(path) = &self.path else {
            return;
        };

        let entry = format!(
            "{} {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            body
        );
        if let Err(e) = write_entry(path, &entry).await {
            warn!("Failed to write diagnostic log {}: {}", path.display(), e);
        }
    }
}

async fn write_entry(path: &Path, entry: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(entry.as_bytes()).await?;
    file.flush().await
}

/// Render a request entry: a header line plus pretty-printed params
pub fn format_request(request: &JsonRpcRequest) -> String {
    let mut entry = format!(">> Request: [{}] {}", request.id, request.method);
    if let Some(params) = &request.params {
        entry.push_str("\nparams:\n");
        entry.push_str(&pretty(params));
    }
    entry
}

/// Render a response entry: a header line plus the pretty-printed result or error
pub fn format_response(response: &JsonRpcResponse) -> String {
    match (&response.result, &response.error) {
        (_, Some(error)) => format!(
            ">> Response: [{}] Failed\nError:\n{}",
            response.id,
            pretty(error)
        ),
        (result, None) => format!(
            ">> Response: [{}] Succeed\nResult:\n{}",
            response.id,
            pretty(result)
        ),
    }
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("<unserializable: {}>", e))
}
