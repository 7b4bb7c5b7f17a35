//! MCP server validation tests.
//!
//! Tests JSON-RPC 2.0 protocol compliance, tool listing, and error handling
//! by driving `McpServer::handle_message` in-process. No tool here touches
//! the network: calls use unparseable URLs so they degrade at the boundary.

use serde_json::{json, Value};

use webharvest_mcp::McpServer;

fn test_server() -> McpServer {
    McpServer::new("http://localhost:4444")
}

async fn request(server: &McpServer, body: Value) -> Value {
    let response = server
        .handle_message(&body.to_string())
        .await
        .expect("expected a response");
    serde_json::to_value(&response).expect("response serializes")
}

async fn initialize(server: &McpServer) -> Value {
    request(
        server,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "0.1.0"}
            }
        }),
    )
    .await
}

fn result_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap_or("")
}

// ============================================================================
// Protocol Compliance Tests
// ============================================================================

#[tokio::test]
async fn test_initialize_handshake() {
    let server = test_server();
    let response = initialize(&server).await;

    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], 1);
    assert!(response.get("error").is_none(), "should not have error");
    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(response["result"]["serverInfo"]["name"], "webharvest-mcp");
    assert!(response["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_list_tools() {
    let server = test_server();
    initialize(&server).await;

    let response = request(
        &server,
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
    )
    .await;

    assert!(response.get("error").is_none(), "should not have error");
    let tools = response["result"]["tools"]
        .as_array()
        .expect("tools array");
    let tool_names: Vec<&str> = tools
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();

    assert!(tool_names.contains(&"fetch_page_content"));
    assert!(tool_names.contains(&"fetch_page_content_rendered"));
    assert!(tool_names.contains(&"extract_site_links"));
    assert!(tool_names.contains(&"extract_site_links_rendered"));

    // Every tool must declare a url parameter in its input schema.
    for tool in tools {
        assert!(
            tool["inputSchema"]["properties"]["url"].is_object(),
            "tool {} missing url parameter",
            tool["name"]
        );
    }
}

#[tokio::test]
async fn test_list_tools_requires_initialization() {
    let server = test_server();

    let response = request(
        &server,
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
    )
    .await;

    assert_eq!(response["error"]["code"], -32603);
}

#[tokio::test]
async fn test_ping() {
    let server = test_server();
    let response = request(&server, json!({"jsonrpc": "2.0", "id": 3, "method": "ping"})).await;
    assert!(response.get("error").is_none());
    assert!(response["result"].is_object());
}

#[tokio::test]
async fn test_notification_gets_no_response() {
    let server = test_server();
    let response = server
        .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await;
    assert!(response.is_none());
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[tokio::test]
async fn test_unknown_method_error() {
    let server = test_server();

    let response = request(
        &server,
        json!({"jsonrpc": "2.0", "id": 99, "method": "nonexistent/method"}),
    )
    .await;

    assert_eq!(response["error"]["code"], -32601);
}

#[tokio::test]
async fn test_unknown_tool_error() {
    let server = test_server();
    initialize(&server).await;

    let response = request(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 100,
            "method": "tools/call",
            "params": {"name": "nonexistent_tool", "arguments": {}}
        }),
    )
    .await;

    assert_eq!(response["error"]["code"], -32601);
    assert!(response["error"]["message"]
        .as_str()
        .unwrap_or("")
        .contains("not found"));
}

#[tokio::test]
async fn test_tool_call_missing_arguments_is_invalid_params() {
    let server = test_server();
    initialize(&server).await;

    let response = request(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 101,
            "method": "tools/call",
            "params": {"name": "fetch_page_content", "arguments": {}}
        }),
    )
    .await;

    assert_eq!(response["error"]["code"], -32602);
}

// ============================================================================
// Tool Degradation Tests
// ============================================================================

#[tokio::test]
async fn test_extract_site_links_bad_url_degrades_to_error_payload() {
    let server = test_server();
    initialize(&server).await;

    let response = request(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 10,
            "method": "tools/call",
            "params": {"name": "extract_site_links", "arguments": {"url": "not a url"}}
        }),
    )
    .await;

    // The failure is a structured payload, not a protocol error.
    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], true);

    let payload: Value = serde_json::from_str(result_text(&response)).expect("JSON payload");
    assert!(payload["error"].as_str().is_some());
    assert_eq!(payload["base_url"], "not a url");
    assert_eq!(payload["links"], json!([]));
}

#[tokio::test]
async fn test_fetch_page_content_bad_url_degrades_to_text_error() {
    let server = test_server();
    initialize(&server).await;

    let response = request(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 11,
            "method": "tools/call",
            "params": {"name": "fetch_page_content", "arguments": {"url": "not a url"}}
        }),
    )
    .await;

    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], true);
    assert!(result_text(&response).starts_with("Error:"));
}

#[tokio::test]
async fn test_rendered_tools_reject_pdf_urls() {
    let server = test_server();
    initialize(&server).await;

    let response = request(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 12,
            "method": "tools/call",
            "params": {
                "name": "extract_site_links_rendered",
                "arguments": {"url": "https://example.com/report.PDF"}
            }
        }),
    )
    .await;

    assert_eq!(response["result"]["isError"], true);
    let payload: Value = serde_json::from_str(result_text(&response)).expect("JSON payload");
    assert_eq!(payload["error"], "PDF files are not supported");
}

#[tokio::test]
async fn test_shutdown_acknowledged() {
    let server = test_server();
    initialize(&server).await;

    let response = request(
        &server,
        json!({"jsonrpc": "2.0", "id": 20, "method": "shutdown"}),
    )
    .await;

    assert!(response.get("error").is_none());
}
