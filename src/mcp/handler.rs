use serde::Serialize;
use serde_json::{Value, json};

use super::protocol::*;
use super::resources::{read_resource, resource_templates};
use super::tools::{call_tool, tool_definitions};
use crate::AppState;

pub const SERVER_NAME: &str = "YAPS";

const INSTRUCTIONS: &str =
    "Kaito YAPS API MCP Server providing tokenized attention scores for X/Twitter accounts";

/// MCP 请求处理
#[derive(Clone)]
pub struct McpHandler {
    state: AppState,
}

impl McpHandler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// 处理一行原始 JSON，通知返回 None
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => self.handle_value(value).await,
            Err(e) => Some(JsonRpcResponse::error(
                JsonRpcId::Null,
                JsonRpcError::parse_error(format!("Parse error: {}", e)),
            )),
        }
    }

    /// 处理一行原始字节，非 UTF-8 输入按解析错误处理
    pub async fn handle_bytes(&self, raw: &[u8]) -> Option<JsonRpcResponse> {
        match std::str::from_utf8(raw) {
            Ok(text) => self.handle_message(text).await,
            Err(e) => Some(JsonRpcResponse::error(
                JsonRpcId::Null,
                JsonRpcError::parse_error(format!("Parse error: {}", e)),
            )),
        }
    }

    pub async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => Some(JsonRpcResponse::error(
                JsonRpcId::Null,
                JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
            )),
        }
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::info!(method = %request.method, "MCP request received");

        let Some(id) = request.id else {
            tracing::debug!(method = %request.method, "MCP notification");
            return None;
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
            ));
        }

        let result = match request.method.as_str() {
            "initialize" => to_result(self.initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => to_result(ListToolsResult {
                tools: tool_definitions(),
            }),
            "tools/call" => self.call_tool(request.params).await,
            "resources/list" => Ok(json!({ "resources": [] })),
            "resources/templates/list" => to_result(ListResourceTemplatesResult {
                resource_templates: resource_templates(),
            }),
            "resources/read" => self.read_resource(request.params).await,
            other => {
                tracing::warn!(method = %other, "Unknown MCP method");
                Err(JsonRpcError::method_not_found(other))
            }
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    fn initialize(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
                resources: Some(ResourcesCapability::default()),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = parse_params(params, "tool call")?;
        tracing::info!(tool = %params.name, "Executing MCP tool");
        let result = call_tool(&self.state, &params.name, params.arguments).await?;
        to_result(result)
    }

    async fn read_resource(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: ReadResourceParams = parse_params(params, "resource read")?;
        let result = read_resource(&self.state, &params.uri).await?;
        to_result(result)
    }
}

fn parse_params<T: for<'de> serde::Deserialize<'de>>(
    params: Option<Value>,
    what: &str,
) -> Result<T, JsonRpcError> {
    let params = params.ok_or_else(|| JsonRpcError::invalid_params(format!("Missing {} params", what)))?;
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid {} params: {}", what, e)))
}

fn to_result<T: Serialize>(value: T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}
