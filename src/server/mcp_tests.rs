//! Unit tests for MCP protocol implementation.
//!
//! Tests JSON-RPC 2.0 request/response handling, tool definitions,
//! and MCP type serialization.

use super::*;
use serde_json::json;

// ============================================================================
// JsonRpcResponse tests
// ============================================================================

#[test]
fn test_jsonrpc_response_success_with_id() {
    let response = JsonRpcResponse::success(Some(json!(1)), json!({"result": "ok"}));

    assert_eq!(response.jsonrpc, "2.0");
    assert_eq!(response.id, json!(1));
    assert!(response.result.is_some());
    assert!(response.error.is_none());
    assert_eq!(response.result.unwrap()["result"], "ok");
}

#[test]
fn test_jsonrpc_response_success_without_id() {
    let response = JsonRpcResponse::success(None, json!({"data": "value"}));

    assert_eq!(response.id, Value::Null);
    assert!(response.result.is_some());
}

#[test]
fn test_jsonrpc_response_error_with_id() {
    let response = JsonRpcResponse::error(Some(json!(42)), -32600, "Invalid request");

    assert_eq!(response.jsonrpc, "2.0");
    assert_eq!(response.id, json!(42));
    assert!(response.result.is_none());

    let error = response.error.unwrap();
    assert_eq!(error.code, -32600);
    assert_eq!(error.message, "Invalid request");
}

#[test]
fn test_jsonrpc_response_serialization() {
    let response = JsonRpcResponse::success(Some(json!(1)), json!({"test": true}));
    let serialized = serde_json::to_string(&response).unwrap();

    assert!(serialized.contains("\"jsonrpc\":\"2.0\""));
    assert!(serialized.contains("\"id\":1"));
    assert!(serialized.contains("\"result\""));
    // Error should be omitted when None
    assert!(!serialized.contains("\"error\""));
}

#[test]
fn test_jsonrpc_error_serialization() {
    let response = JsonRpcResponse::error(Some(json!(1)), -32601, "Method not found");
    let serialized = serde_json::to_string(&response).unwrap();

    assert!(serialized.contains("\"error\""));
    assert!(serialized.contains("-32601"));
    // Result should be omitted when None
    assert!(!serialized.contains("\"result\""));
}

// ============================================================================
// JsonRpcRequest deserialization tests
// ============================================================================

#[test]
fn test_jsonrpc_request_deserialization() {
    let json_str = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#;
    let request: JsonRpcRequest = serde_json::from_str(json_str).unwrap();

    assert_eq!(request.jsonrpc, "2.0");
    assert_eq!(request.id, Some(json!(1)));
    assert_eq!(request.method, "initialize");
    assert!(request.params.is_some());
}

#[test]
fn test_jsonrpc_request_without_params() {
    let json_str = r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#;
    let request: JsonRpcRequest = serde_json::from_str(json_str).unwrap();

    assert_eq!(request.method, "tools/list");
    assert!(request.params.is_none());
}

#[test]
fn test_jsonrpc_notification_no_id() {
    let json_str = r#"{"jsonrpc":"2.0","method":"initialized","params":{}}"#;
    let request: JsonRpcRequest = serde_json::from_str(json_str).unwrap();

    assert!(request.id.is_none());
    assert_eq!(request.method, "initialized");
}

// ============================================================================
// Tool definition tests
// ============================================================================

fn all_tools() -> Vec<Tool> {
    vec![
        get_trail_start_tool(),
        get_trail_open_source_tool(),
        get_trail_branch_tool(),
        get_trail_note_tool(),
        get_trail_summary_tool(),
        get_trail_export_tool(),
        get_trail_import_tool(),
        get_trail_load_tool(),
        get_search_sources_tool(),
        get_search_configure_tool(),
        get_tangents_generate_tool(),
    ]
}

#[test]
fn test_tool_names_are_unique() {
    let tools = all_tools();
    let mut names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    names.sort();
    let before = names.len();
    names.dedup();
    assert_eq!(names.len(), before, "Duplicate tool name");
}

#[test]
fn test_tool_schemas_are_objects() {
    for tool in all_tools() {
        assert_eq!(
            tool.input_schema["type"], "object",
            "Schema for {} must be an object",
            tool.name
        );
        assert!(
            !tool.description.is_empty(),
            "Tool {} needs a description",
            tool.name
        );
    }
}

#[test]
fn test_trail_start_requires_query() {
    let tool = get_trail_start_tool();
    assert_eq!(tool.name, "trail_start");
    assert_eq!(tool.input_schema["required"], json!(["query"]));
}

#[test]
fn test_trail_open_source_requires_card_fields() {
    let tool = get_trail_open_source_tool();
    assert_eq!(
        tool.input_schema["required"],
        json!(["url", "title", "domain"])
    );
}

#[test]
fn test_search_sources_lists_buckets() {
    let tool = get_search_sources_tool();
    let buckets = &tool.input_schema["properties"]["buckets"]["items"]["enum"];
    assert_eq!(
        *buckets,
        json!(["encyclopedia", "primary", "news", "blog", "forum", "dataset"])
    );
}

#[test]
fn test_tool_serialization_uses_input_schema_key() {
    let tool = get_trail_note_tool();
    let value = serde_json::to_value(&tool).unwrap();
    assert!(value.get("inputSchema").is_some());
    assert!(value.get("input_schema").is_none());
}
