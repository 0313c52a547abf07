/// Public library interface for the touch MCP server
///
/// This module exports the server implementation and the public types
/// used by the binary and the tests.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;

pub mod config;
pub mod diagnostics;
pub mod mcp;
pub mod tools;

pub use config::ServerConfig;
pub use diagnostics::DiagnosticLog;
pub use mcp::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use mcp::{DispatchOutcome, McpError, McpServer};
pub use tools::{TouchArgs, TouchTool};

/// Errors that stop the server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Touch server that implements the MCP protocol
///
/// Owns the resolved configuration and the tool and log built from it.
pub struct TouchServer {
    config: ServerConfig,
    touch: TouchTool,
    log: DiagnosticLog,
}

impl TouchServer {
    pub fn new(config: ServerConfig) -> Self {
        let touch = TouchTool::from_config(&config);
        let log = match &config.log_file {
            Some(path) => DiagnosticLog::new(path.clone()),
            None => DiagnosticLog::disabled(),
        };

        Self { config, touch, log }
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin is exhausted or the client
    /// violates the protocol.
    pub async fn run(self) -> Result<(), ServerError> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Run one session over arbitrary streams
    pub async fn serve<R, W>(self, reader: R, writer: W) -> Result<(), ServerError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let log = self.log.clone();
        log.note("starting").await;

        let mut server = McpServer::new(reader, writer, self.touch, self.log);
        let result = server.run().await;

        info!("Session ended");
        log.note("exiting").await;
        result
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
