//! MCP server implementation.
//!
//! Handles the JSON-RPC lifecycle (initialize, tool discovery, tool calls)
//! over either stdio or HTTP, delegating every tool call to the executor.

use crate::catalog::builtin_tools;
use crate::error::McpError;
use crate::executor::{ExecutionResult, ToolExecutor};
use crate::http_transport::HttpServer;
use crate::protocol::*;
use crate::tools::ToolRegistry;
use loupe_core::{DocumentStore, LoupeConfig, Transport};
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tokio::sync::mpsc;

/// The MCP server.
#[derive(Clone)]
pub struct McpServer {
    config: LoupeConfig,
    tools: ToolRegistry,
    executor: ToolExecutor,
}

impl McpServer {
    /// Create a server over a store, registering the built-in tool catalog.
    pub fn new(config: LoupeConfig, store: Arc<dyn DocumentStore>) -> Self {
        let mut tools = ToolRegistry::new();
        for tool in builtin_tools() {
            tools.register(tool);
        }
        let executor = ToolExecutor::new(store, &config);
        Self {
            config,
            tools,
            executor,
        }
    }

    /// Start the server on the configured transport.
    pub async fn run(&self) -> Result<(), McpError> {
        match self.config.mcp.transport {
            Transport::Stdio => self.run_stdio().await,
            Transport::Http => self.run_http().await,
        }
    }

    /// Run the server with stdio transport.
    async fn run_stdio(&self) -> Result<(), McpError> {
        tracing::info!("Starting MCP server with stdio transport");

        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let mut stdout_lock = stdout.lock();

        for line in stdin.lock().lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => JsonRpcResponse::error(None, -32700, format!("Parse error: {}", e)),
            };
            let response_json = serde_json::to_string(&response)?;

            writeln!(stdout_lock, "{}", response_json)?;
            stdout_lock.flush()?;
        }

        Ok(())
    }

    /// Run the server with HTTP transport.
    async fn run_http(&self) -> Result<(), McpError> {
        tracing::info!(
            host = %self.config.mcp.host,
            port = self.config.mcp.port,
            "Starting MCP server with HTTP transport"
        );

        let (request_tx, mut request_rx) =
            mpsc::channel::<(JsonRpcRequest, mpsc::Sender<JsonRpcResponse>)>(100);

        let handler = self.clone();
        tokio::spawn(async move {
            while let Some((request, response_tx)) = request_rx.recv().await {
                let response = handler.handle_request(request).await;
                let _ = response_tx.send(response).await;
            }
        });

        let http_server = HttpServer::new(
            self.config.mcp.host.clone(),
            self.config.mcp.port,
            request_tx,
        );
        http_server.run().await
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" | "notifications/initialized" => JsonRpcResponse::success(id, json!({})),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "shutdown" => self.handle_shutdown(id),
            _ => JsonRpcResponse::error(
                id,
                -32601,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": "2024-11-05",
            "serverInfo": {
                "name": "loupe-mcp",
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools: Vec<_> = self
            .tools
            .list()
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema,
                    "annotations": t.annotations
                })
            })
            .collect();

        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, format!("Invalid params: {}", e))
                }
            },
            None => return JsonRpcResponse::error(id, -32602, "Missing params"),
        };

        if !self.tools.contains(&params.name) {
            return JsonRpcResponse::error(
                id,
                -32602,
                format!("Tool not found: {}", params.name),
            );
        }

        let result = self.executor.execute(&params.name, params.arguments).await;
        execution_result_to_response(id, result)
    }

    fn handle_shutdown(&self, id: Option<Value>) -> JsonRpcResponse {
        tracing::info!("MCP server shutdown requested");
        JsonRpcResponse::success(id, json!(null))
    }
}

fn execution_result_to_response(id: Option<Value>, result: ExecutionResult) -> JsonRpcResponse {
    let content: Vec<_> = result
        .content
        .iter()
        .map(|c| match c {
            ToolContent::Text { text } => json!({"type": "text", "text": text}),
            ToolContent::Json { json } => json!({"type": "json", "json": json}),
        })
        .collect();

    JsonRpcResponse::success(
        id,
        json!({
            "content": content,
            "isError": !result.success
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bson::Document;
    use loupe_core::{
        CollectionSummary, DatabaseSummary, FindQuery, GeoNearQuery, GeoShapeQuery, TextQuery,
    };

    struct EmptyStore;

    #[async_trait]
    impl DocumentStore for EmptyStore {
        async fn list_databases(&self) -> anyhow::Result<Vec<DatabaseSummary>> {
            Ok(Vec::new())
        }
        async fn list_collections(&self, _db: &str) -> anyhow::Result<Vec<CollectionSummary>> {
            Ok(Vec::new())
        }
        async fn find(
            &self,
            _db: &str,
            _collection: &str,
            _query: FindQuery,
        ) -> anyhow::Result<Vec<Document>> {
            Ok(Vec::new())
        }
        async fn aggregate(
            &self,
            _db: &str,
            _collection: &str,
            _pipeline: Vec<Document>,
            _limit: Option<i64>,
        ) -> anyhow::Result<Vec<Document>> {
            Ok(Vec::new())
        }
        async fn distinct(
            &self,
            _db: &str,
            _collection: &str,
            _field: &str,
            _filter: Document,
        ) -> anyhow::Result<Vec<bson::Bson>> {
            Ok(Vec::new())
        }
        async fn sample(
            &self,
            _db: &str,
            _collection: &str,
            _size: i64,
        ) -> anyhow::Result<Vec<Document>> {
            Ok(Vec::new())
        }
        async fn count_documents(
            &self,
            _db: &str,
            _collection: &str,
            _filter: Document,
        ) -> anyhow::Result<u64> {
            Ok(0)
        }
        async fn collection_stats(&self, _db: &str, _collection: &str) -> anyhow::Result<Document> {
            Ok(Document::new())
        }
        async fn indexes(&self, _db: &str, _collection: &str) -> anyhow::Result<Vec<Document>> {
            Ok(Vec::new())
        }
        async fn explain(
            &self,
            _db: &str,
            _collection: &str,
            _query: FindQuery,
        ) -> anyhow::Result<Document> {
            Ok(Document::new())
        }
        async fn geo_near(
            &self,
            _db: &str,
            _collection: &str,
            _query: GeoNearQuery,
        ) -> anyhow::Result<Vec<Document>> {
            Ok(Vec::new())
        }
        async fn geo_shape(
            &self,
            _db: &str,
            _collection: &str,
            _query: GeoShapeQuery,
        ) -> anyhow::Result<Vec<Document>> {
            Ok(Vec::new())
        }
        async fn text_search(
            &self,
            _db: &str,
            _collection: &str,
            _query: TextQuery,
        ) -> anyhow::Result<Vec<Document>> {
            Ok(Vec::new())
        }
    }

    fn test_server() -> McpServer {
        McpServer::new(LoupeConfig::default(), Arc::new(EmptyStore))
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = test_server();
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: "initialize".to_string(),
            params: None,
        };

        let response = server.handle_request(request).await;
        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "loupe-mcp");
        assert_eq!(result["protocolVersion"], "2024-11-05");
    }

    #[tokio::test]
    async fn test_list_tools_has_full_catalog() {
        let server = test_server();
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: "tools/list".to_string(),
            params: None,
        };

        let response = server.handle_request(request).await;
        let result = response.result.unwrap();
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 14);
        assert!(tools.iter().all(|t| t["annotations"]["readOnly"] == true));
    }

    #[tokio::test]
    async fn test_call_nonexistent_tool() {
        let server = test_server();
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: "tools/call".to_string(),
            params: Some(json!({
                "name": "drop_collection",
                "arguments": {}
            })),
        };

        let response = server.handle_request(request).await;
        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = test_server();
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(7)),
            method: "resources/list".to_string(),
            params: None,
        };

        let response = server.handle_request(request).await;
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_call_without_database_is_an_error_result() {
        let server = test_server();
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(2)),
            method: "tools/call".to_string(),
            params: Some(json!({
                "name": "list_collections",
                "arguments": {}
            })),
        };

        let response = server.handle_request(request).await;
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("no database selected"));
    }
}
