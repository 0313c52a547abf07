/// MCP protocol implementation
///
/// This module handles the Model Context Protocol communication,
/// including JSON-RPC framing, method routing and error mapping.

pub mod error;
pub mod protocol;
pub mod server;
pub mod transport;

// Re-export main types
pub use error::McpError;
pub use server::{DispatchOutcome, McpMethod, McpServer, ToolCall};
pub use transport::{MessageReader, TransportError};
