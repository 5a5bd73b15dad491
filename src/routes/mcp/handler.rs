use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{AppState, mcp::McpHandler};

// 无状态模式：每个 POST 携带一条 JSON-RPC 消息
pub async fn handle_mcp(State(state): State<AppState>, body: String) -> Response {
    tracing::debug!("Received MCP request: {}", body);

    match McpHandler::new(state).handle_message(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
