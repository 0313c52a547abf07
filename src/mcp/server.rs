/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the dispatch loop that:
/// 1. Reads JSON-RPC requests from the input stream
/// 2. Routes them by method, running the touch tool for `tools/call`
/// 3. Writes one JSON-RPC response per request to the output stream

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info, warn};

use crate::diagnostics::DiagnosticLog;
use crate::mcp::error::McpError;
use crate::mcp::protocol::*;
use crate::mcp::transport::{write_message, MessageReader};
use crate::tools::{TouchArgs, TouchTool, TOUCH_TOOL_NAME};
use crate::ServerError;

/// A tool call with its arguments decoded for the named tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Touch(TouchArgs),
}

impl ToolCall {
    fn from_params(params: Option<Value>) -> Result<Self, McpError> {
        let params = params.ok_or_else(|| McpError::invalid_params("Missing 'params' for 'tools/call'"))?;
        let params: ToolCallParams = serde_json::from_value(params).map_err(|e| {
            McpError::invalid_params(format!("Failed to parse 'tools/call' params: {}", e))
        })?;

        match params.name.as_str() {
            TOUCH_TOOL_NAME => Ok(Self::Touch(TouchArgs::from_arguments(params.arguments)?)),
            _ => Err(McpError::ToolNotFound { name: params.name }),
        }
    }
}

/// A request decoded according to its method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McpMethod {
    Initialize,
    Initialized,
    Cancelled,
    ListTools,
    ListResources,
    ListPrompts,
    CallTool(ToolCall),
    Unknown(String),
}

impl McpMethod {
    /// Decode the params for `method`
    ///
    /// Params of methods other than `tools/call` are ignored.
    pub fn parse(method: &str, params: Option<Value>) -> Result<Self, McpError> {
        Ok(match method {
            "initialize" => Self::Initialize,
            "notifications/initialized" | "initialized" => Self::Initialized,
            "notifications/cancelled" | "cancelled" => Self::Cancelled,
            "tools/list" => Self::ListTools,
            "resources/list" => Self::ListResources,
            "prompts/list" => Self::ListPrompts,
            "tools/call" => Self::CallTool(ToolCall::from_params(params)?),
            other => Self::Unknown(other.to_string()),
        })
    }

    /// Notifications never get a reply
    pub fn is_notification(&self) -> bool {
        matches!(self, Self::Initialized | Self::Cancelled)
    }
}

/// What the loop does after handling one message
#[derive(Debug)]
pub enum DispatchOutcome {
    Reply(JsonRpcResponse),
    NoReply,
    /// Send this final response, then stop reading
    Terminate(JsonRpcResponse),
}

/// MCP server bound to one input and one output stream
pub struct McpServer<R, W> {
    reader: MessageReader<R>,
    writer: W,
    touch: TouchTool,
    log: DiagnosticLog,
}

impl<R, W> McpServer<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, touch: TouchTool, log: DiagnosticLog) -> Self {
        Self {
            reader: MessageReader::new(reader),
            writer,
            touch,
            log,
        }
    }

    /// Serve requests until the input ends or a protocol violation occurs
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        loop {
            match self.next_outcome().await {
                DispatchOutcome::Reply(response) => self.send(&response).await?,
                DispatchOutcome::NoReply => {}
                DispatchOutcome::Terminate(response) => {
                    // The peer may already be gone; nothing is left to report to.
                    if let Err(e) = self.send(&response).await {
                        warn!("Failed to send final response: {}", e);
                    }
                    break;
                }
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }

    async fn next_outcome(&mut self) -> DispatchOutcome {
        let request = match self.reader.next_request().await {
            Ok(request) => request,
            Err(e) => {
                debug!("Stopping on undecodable input: {}", e);
                let e = McpError::Parse {
                    message: e.to_string(),
                };
                return DispatchOutcome::Terminate(e.to_response(Value::Null));
            }
        };

        self.log.request(&request).await;

        if request.jsonrpc != JSONRPC_VERSION {
            error!("Rejecting request with jsonrpc version '{}'", request.jsonrpc);
            let e = McpError::InvalidRequest {
                version: request.jsonrpc,
            };
            return DispatchOutcome::Terminate(e.to_response(request.id));
        }

        self.dispatch(request).await
    }

    /// Route one protocol-checked request
    pub async fn dispatch(&self, request: JsonRpcRequest) -> DispatchOutcome {
        debug!("Handling method {}", request.method);
        let id = request.id;

        let method = match McpMethod::parse(&request.method, request.params) {
            Ok(method) => method,
            Err(e) => return DispatchOutcome::Reply(e.to_response(id)),
        };

        match method {
            McpMethod::Initialize => {
                info!("MCP client connected");
                reply(id, &InitializeResult::for_this_server())
            }
            McpMethod::Initialized | McpMethod::Cancelled => DispatchOutcome::NoReply,
            McpMethod::ListTools => reply(
                id,
                &ListToolsResult {
                    tools: vec![TouchTool::definition()],
                },
            ),
            McpMethod::ListResources => reply(id, &ListResourcesResult { resources: vec![] }),
            McpMethod::ListPrompts => reply(id, &ListPromptsResult { prompts: vec![] }),
            McpMethod::CallTool(call) => match self.call_tool(call).await {
                Ok(result) => reply(id, &result),
                Err(e) => DispatchOutcome::Reply(e.to_response(id)),
            },
            McpMethod::Unknown(method) => {
                DispatchOutcome::Reply(McpError::MethodNotFound { method }.to_response(id))
            }
        }
    }

    async fn call_tool(&self, call: ToolCall) -> Result<ToolCallResult, McpError> {
        match call {
            ToolCall::Touch(args) => {
                let response = self.touch.touch(&args).await?;
                info!("Created {}", response.path.display());
                Ok(ToolCallResult::text(response.message))
            }
        }
    }

    async fn send(&mut self, response: &JsonRpcResponse) -> Result<(), ServerError> {
        write_message(&mut self.writer, response).await?;
        self.log.response(response).await;
        Ok(())
    }
}

fn reply<T: Serialize>(id: Value, result: &T) -> DispatchOutcome {
    match serde_json::to_value(result) {
        Ok(value) => DispatchOutcome::Reply(JsonRpcResponse::success(id, value)),
        Err(e) => DispatchOutcome::Reply(
            McpError::internal(format!("Failed to encode result: {}", e)).to_response(id),
        ),
    }
}
