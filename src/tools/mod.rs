/// MCP tools exposed by this server
///
/// Only one tool exists: `touch-mcp`, which creates an empty file.

pub mod touch;

pub use touch::*;
