/// Protocol-level errors and their JSON-RPC codes
///
/// Every failure the dispatch loop can report ends up here, so the mapping
/// from error kind to wire code lives in exactly one place.

use serde_json::Value;
use thiserror::Error;

use crate::mcp::protocol::{error_codes, JsonRpcResponse};

/// Errors reported to the client as JSON-RPC error responses
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Failed to decode request: {message}")]
    Parse { message: String },

    #[error("Invalid jsonrpc version '{version}'")]
    InvalidRequest { version: String },

    #[error("Method '{method}' not found")]
    MethodNotFound { method: String },

    #[error("Tool '{name}' not found")]
    ToolNotFound { name: String },

    #[error("{message}")]
    InvalidParams { message: String },

    #[error("{message}")]
    Internal { message: String },
}

impl McpError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The JSON-RPC error code for this error
    pub fn code(&self) -> i32 {
        match self {
            Self::Parse { .. } => error_codes::PARSE_ERROR,
            Self::InvalidRequest { .. } => error_codes::INVALID_REQUEST,
            Self::MethodNotFound { .. } | Self::ToolNotFound { .. } => {
                error_codes::METHOD_NOT_FOUND
            }
            Self::InvalidParams { .. } => error_codes::INVALID_PARAMS,
            Self::Internal { .. } => error_codes::INTERNAL_ERROR,
        }
    }

    /// Whether the dispatch loop must stop after reporting this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::InvalidRequest { .. })
    }

    /// Build the error response for the request with the given id
    pub fn to_response(&self, id: Value) -> JsonRpcResponse {
        JsonRpcResponse::error(id, self.code(), self.to_string(), None)
    }
}
