//! MCP protocol implementation for JSON-RPC 2.0 communication.
//!
//! This module provides the core MCP server implementation including:
//! - JSON-RPC 2.0 request/response handling
//! - Tool definitions and schemas
//! - Stdio-based server communication

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use super::{handle_tool_call, SharedState};

#[cfg(test)]
#[path = "mcp_tests.rs"]
mod mcp_tests;

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request identifier (None for notifications).
    pub id: Option<Value>,
    /// The method name to invoke.
    pub method: String,
    /// Optional parameters for the method.
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: String,
    /// Request identifier (null if notification, must always be present per spec).
    pub id: Value,
    /// The result on success (mutually exclusive with error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The error on failure (mutually exclusive with result).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// Error code (negative for predefined errors).
    pub code: i32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional error data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// MCP server information returned during initialization.
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    /// The server name identifier.
    pub name: String,
    /// The server version string.
    pub version: String,
}

/// MCP server capabilities advertised to clients.
#[derive(Debug, Serialize)]
pub struct Capabilities {
    /// Tool-related capabilities.
    pub tools: ToolCapabilities,
}

/// Tool-specific capabilities.
#[derive(Debug, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change dynamically.
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Result of the MCP initialize handshake.
#[derive(Debug, Serialize)]
pub struct InitializeResult {
    /// The MCP protocol version supported.
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Server capabilities.
    pub capabilities: Capabilities,
    /// Server identification information.
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

/// MCP tool definition with JSON Schema.
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    /// Unique tool name (used in tool calls).
    pub name: String,
    /// Human-readable description of the tool.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Parameters for a tools/call request.
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    /// The name of the tool to invoke.
    pub name: String,
    /// Optional arguments for the tool.
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Content item within a tool result.
#[derive(Debug, Serialize)]
pub struct ToolResultContent {
    /// The content type (e.g., "text").
    #[serde(rename = "type")]
    pub content_type: String,
    /// The text content of the result.
    pub text: String,
}

/// Result of a tool invocation.
#[derive(Debug, Serialize)]
pub struct ToolCallResult {
    /// The result content items.
    pub content: Vec<ToolResultContent>,
    /// Whether the result represents an error.
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// MCP Server running over stdio.
///
/// Handles JSON-RPC 2.0 messages over stdin/stdout for MCP protocol
/// communication with clients.
pub struct McpServer {
    /// Shared application state.
    state: SharedState,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Run the server using async stdio
    pub async fn run(&self) -> std::io::Result<()> {
        info!("Trailhead server starting...");

        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            // EOF reached
            if bytes_read == 0 {
                info!("EOF received, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            debug!(request = %trimmed, "Received request");

            let response = match serde_json::from_str::<JsonRpcRequest>(trimmed) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => {
                    error!(error = %e, "Failed to parse request");
                    Some(JsonRpcResponse::error(
                        None,
                        -32700,
                        format!("Parse error: {}", e),
                    ))
                }
            };

            // Only send response if not a notification (per JSON-RPC 2.0 spec)
            if let Some(response) = response {
                let response_json = serde_json::to_string(&response)?;
                debug!(response = %response_json, "Sending response");

                stdout.write_all(response_json.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle a single JSON-RPC request
    /// Returns None for notifications (requests without id) per JSON-RPC 2.0 spec
    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        // Check if this is a notification (no id = no response required)
        let is_notification = request.id.is_none();

        match request.method.as_str() {
            "initialize" => Some(self.handle_initialize(request.id)),
            "initialized" => {
                // Notification - no response per JSON-RPC 2.0
                debug!("Received initialized notification");
                None
            }
            "notifications/cancelled" => {
                // Notification - no response
                debug!("Received cancelled notification");
                None
            }
            "tools/list" => Some(self.handle_tools_list(request.id)),
            "tools/call" => Some(self.handle_tool_call(request.id, request.params).await),
            "ping" => Some(JsonRpcResponse::success(
                request.id,
                Value::Object(Default::default()),
            )),
            method => {
                // For unknown methods, only respond if it's a request (has id)
                if is_notification {
                    debug!(method = %method, "Unknown notification, ignoring");
                    None
                } else {
                    error!(method = %method, "Unknown method");
                    Some(JsonRpcResponse::error(
                        request.id,
                        -32601,
                        format!("Method not found: {}", method),
                    ))
                }
            }
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("Handling initialize request");

        let result = InitializeResult {
            protocol_version: "2024-11-05".to_string(),
            capabilities: Capabilities {
                tools: ToolCapabilities {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: "trailhead".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        match serde_json::to_value(result) {
            Ok(val) => JsonRpcResponse::success(id, val),
            Err(e) => {
                error!(error = %e, "Failed to serialize initialize result");
                JsonRpcResponse::error(id, -32603, format!("Internal error: {}", e))
            }
        }
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("Handling tools/list request");

        let tools = vec![
            // Trail lifecycle
            get_trail_start_tool(),
            get_trail_open_source_tool(),
            get_trail_branch_tool(),
            get_trail_note_tool(),
            get_trail_summary_tool(),
            // Sharing
            get_trail_export_tool(),
            get_trail_import_tool(),
            get_trail_load_tool(),
            // Collaborators
            get_search_sources_tool(),
            get_search_configure_tool(),
            get_tangents_generate_tool(),
        ];

        JsonRpcResponse::success(
            id,
            serde_json::json!({
                "tools": tools
            }),
        )
    }

    /// Handle tools/call request
    async fn handle_tool_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, format!("Invalid params: {}", e));
                }
            },
            None => {
                return JsonRpcResponse::error(id, -32602, "Missing params");
            }
        };

        info!(tool = %params.name, "Handling tool call");

        let (content, is_error) =
            match handle_tool_call(&self.state, &params.name, params.arguments).await {
                Ok(result) => {
                    let text = serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
                        error!(error = %e, "Failed to serialize tool result");
                        format!("{{\"error\": \"Serialization failed: {}\"}}", e)
                    });
                    (
                        ToolResultContent {
                            content_type: "text".to_string(),
                            text,
                        },
                        None,
                    )
                }
                Err(e) => (
                    ToolResultContent {
                        content_type: "text".to_string(),
                        text: format!("Error: {}", e),
                    },
                    Some(true),
                ),
            };

        let tool_result = ToolCallResult {
            content: vec![content],
            is_error,
        };

        match serde_json::to_value(tool_result) {
            Ok(val) => JsonRpcResponse::success(id, val),
            Err(e) => {
                error!(error = %e, "Failed to serialize tool call result");
                JsonRpcResponse::error(id.clone(), -32603, format!("Internal error: {}", e))
            }
        }
    }
}

/// Get the trail_start tool definition
fn get_trail_start_tool() -> Tool {
    Tool {
        name: "trail_start".to_string(),
        description: "Start a new exploration trail for a query, replacing any active trail, and run an initial search with the current settings.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The query that anchors the trail (may be empty)"
                }
            },
            "required": ["query"],
            "additionalProperties": false
        }),
    }
}

/// Get the trail_open_source tool definition
fn get_trail_open_source_tool() -> Tool {
    Tool {
        name: "trail_open_source".to_string(),
        description: "Record that a source link was opened, appending an open step to the active trail.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Full URL of the opened source"
                },
                "title": {
                    "type": "string",
                    "description": "Title of the source"
                },
                "domain": {
                    "type": "string",
                    "description": "Domain of the source, e.g. wikipedia.org"
                }
            },
            "required": ["url", "title", "domain"],
            "additionalProperties": false
        }),
    }
}

/// Get the trail_branch tool definition
fn get_trail_branch_tool() -> Tool {
    Tool {
        name: "trail_branch".to_string(),
        description: "Pivot the active trail into a new query, appending a branch step.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The follow-up query to branch into"
                }
            },
            "required": ["query"],
            "additionalProperties": false
        }),
    }
}

/// Get the trail_note tool definition
fn get_trail_note_tool() -> Tool {
    Tool {
        name: "trail_note".to_string(),
        description: "Attach a free-text note to the active trail.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The note text"
                }
            },
            "required": ["text"],
            "additionalProperties": false
        }),
    }
}

/// Get the trail_summary tool definition
fn get_trail_summary_tool() -> Tool {
    Tool {
        name: "trail_summary".to_string(),
        description: "Summarize the active trail: exploration score plus derived metrics (outbound clicks, unique domains, depth).".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        }),
    }
}

/// Get the trail_export tool definition
fn get_trail_export_tool() -> Tool {
    Tool {
        name: "trail_export".to_string(),
        description: "Export the active trail as lossless JSON text suitable for sharing or re-import.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        }),
    }
}

/// Get the trail_import tool definition
fn get_trail_import_tool() -> Tool {
    Tool {
        name: "trail_import".to_string(),
        description: "Import a previously exported trail, recompute its metrics, and make it the active trail.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The exported trail JSON text"
                }
            },
            "required": ["text"],
            "additionalProperties": false
        }),
    }
}

/// Get the trail_load tool definition
fn get_trail_load_tool() -> Tool {
    Tool {
        name: "trail_load".to_string(),
        description: "Fetch a stored trail by id, recompute its metrics, and make it the active trail.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "trail_id": {
                    "type": "string",
                    "description": "Id of the stored trail"
                }
            },
            "required": ["trail_id"],
            "additionalProperties": false
        }),
    }
}

/// Get the search_sources tool definition
fn get_search_sources_tool() -> Tool {
    Tool {
        name: "search_sources".to_string(),
        description: "Search for source cards. Omitted parameters fall back to the session's search settings.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "k": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Maximum number of cards to return"
                },
                "lambda": {
                    "type": "number",
                    "minimum": 0,
                    "maximum": 1,
                    "description": "MMR relevance/diversity trade-off"
                },
                "sigma": {
                    "type": "number",
                    "minimum": 0,
                    "maximum": 1,
                    "description": "Serendipity level"
                },
                "provider": {
                    "type": "string",
                    "enum": ["parallel", "sonar", "brave"],
                    "description": "Search provider"
                },
                "buckets": {
                    "type": "array",
                    "items": {
                        "type": "string",
                        "enum": ["encyclopedia", "primary", "news", "blog", "forum", "dataset"]
                    },
                    "description": "Buckets to include"
                },
                "contrarian": {
                    "type": "boolean",
                    "description": "Bias results toward dissenting sources"
                }
            },
            "required": ["query"],
            "additionalProperties": false
        }),
    }
}

/// Get the search_configure tool definition
fn get_search_configure_tool() -> Tool {
    Tool {
        name: "search_configure".to_string(),
        description: "Update the session's default search settings. Only the provided fields change.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "k": {
                    "type": "integer",
                    "minimum": 1
                },
                "lambda": {
                    "type": "number",
                    "minimum": 0,
                    "maximum": 1
                },
                "sigma": {
                    "type": "number",
                    "minimum": 0,
                    "maximum": 1
                },
                "provider": {
                    "type": "string",
                    "enum": ["parallel", "sonar", "brave"]
                },
                "buckets": {
                    "type": "array",
                    "items": {
                        "type": "string",
                        "enum": ["encyclopedia", "primary", "news", "blog", "forum", "dataset"]
                    }
                },
                "contrarian": {
                    "type": "boolean"
                }
            },
            "additionalProperties": false
        }),
    }
}

/// Get the tangents_generate tool definition
fn get_tangents_generate_tool() -> Tool {
    Tool {
        name: "tangents_generate".to_string(),
        description: "Generate follow-up query suggestions for a source card.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Title of the card"
                },
                "url": {
                    "type": "string",
                    "description": "URL of the card"
                },
                "context": {
                    "type": "string",
                    "description": "Snippet or other context"
                }
            },
            "additionalProperties": false
        }),
    }
}
