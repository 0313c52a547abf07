/// Tool for creating empty files
///
/// This module implements the `touch-mcp` MCP tool.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::fs::OpenOptions;
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::mcp::protocol::ToolDefinition;
use crate::mcp::McpError;

/// Name under which the tool is advertised and called
pub const TOUCH_TOOL_NAME: &str = "touch-mcp";

/// Errors from a single `touch-mcp` invocation
#[derive(Error, Debug)]
pub enum TouchError {
    #[error("Missing 'arguments' for 'touch-mcp'")]
    MissingArguments,

    #[error("Failed to parse 'touch-mcp' arguments: {0}")]
    InvalidArguments(#[source] serde_json::Error),

    #[error("Missing or empty file name")]
    EmptyFileName,

    #[error("Failed to create file '{}': {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<TouchError> for McpError {
    fn from(e: TouchError) -> Self {
        match e {
            TouchError::Create { .. } => McpError::internal(e.to_string()),
            _ => McpError::invalid_params(e.to_string()),
        }
    }
}

/// Arguments of a `touch-mcp` call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TouchArgs {
    /// File name to create
    pub file: String,
    /// Directory to create it in; a non-string value counts as absent
    #[serde(rename = "destPath", default, deserialize_with = "string_or_none")]
    pub dest_path: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl TouchArgs {
    /// Decode and validate the `arguments` of a tool call
    pub fn from_arguments(arguments: Option<Value>) -> Result<Self, TouchError> {
        let arguments = arguments.ok_or(TouchError::MissingArguments)?;
        let args: TouchArgs =
            serde_json::from_value(arguments).map_err(TouchError::InvalidArguments)?;

        if args.file.is_empty() {
            return Err(TouchError::EmptyFileName);
        }
        Ok(args)
    }
}

/// Response from creating a file
#[derive(Debug)]
pub struct TouchResponse {
    pub path: PathBuf,
    pub message: String,
}

/// The `touch-mcp` tool with its destination fallbacks resolved
#[derive(Debug, Clone, Default)]
pub struct TouchTool {
    default_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
}

impl TouchTool {
    pub fn new(default_dir: Option<PathBuf>, home_dir: Option<PathBuf>) -> Self {
        Self {
            default_dir,
            home_dir,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.default_touch_path.clone(), config.home_dir.clone())
    }

    /// Descriptor advertised by `tools/list`
    pub fn definition() -> ToolDefinition {
        ToolDefinition {
            name: TOUCH_TOOL_NAME.to_string(),
            description: "Create an empty file".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file": {"type": "string", "description": "File name"},
                    "destPath": {"type": "string", "description": "Destination directory (optional)"}
                },
                "required": ["file"]
            }),
        }
    }

    /// Directory the file goes in: explicit argument, then the configured
    /// default, then home, then the working directory
    pub fn destination(&self, args: &TouchArgs) -> PathBuf {
        if let Some(dest) = &args.dest_path {
            return PathBuf::from(dest);
        }
        self.default_dir
            .clone()
            .or_else(|| self.home_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Create the file, failing if it already exists
    pub async fn touch(&self, args: &TouchArgs) -> Result<TouchResponse, TouchError> {
        let dest = self.destination(args);
        let path = dest.join(&args.file);
        debug!("Creating file at {}", path.display());

        create_new(&path).await.map_err(|source| {
            warn!("Failed to create {}: {}", path.display(), source);
            TouchError::Create {
                path: path.clone(),
                source,
            }
        })?;

        Ok(TouchResponse {
            message: format!(
                "File {} created successfully at {}",
                args.file,
                dest.display()
            ),
            path,
        })
    }
}

async fn create_new(path: &Path) -> std::io::Result<()> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map(drop)
}
