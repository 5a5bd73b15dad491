use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use super::model::{HealthResponse, ResetResponse, StatusResponse};
use crate::{
    AppState,
    error::AppError,
    utils::{ApiResponse, error_codes, error_to_api_response, success_to_api_response},
};

// 健康检查
pub async fn health() -> Json<HealthResponse> {
    tracing::debug!("Health check endpoint accessed");
    Json(HealthResponse {
        status: "ok".into(),
        message: "YAPS MCP server is running".into(),
    })
}

// 服务状态，包含存储与限流情况
pub async fn status(State(state): State<AppState>) -> Json<ApiResponse<StatusResponse>> {
    let health = state.health().await;
    success_to_api_response(StatusResponse {
        server: "running",
        port: state.config.server_port,
        endpoint: state.config.yaps_api_endpoint.clone(),
        health,
    })
}

// 运维重置限流计数器
pub async fn rate_limit_reset(State(state): State<AppState>) -> Json<ApiResponse<ResetResponse>> {
    state.limiter.reset().await;
    tracing::info!("Rate limit counter reset by operator");
    success_to_api_response(ResetResponse {
        limiter: state.limiter.kind(),
        usage: state.limiter.get_usage().await,
    })
}

// 运维触发存储重连
pub async fn reconnect_cache(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref().ok_or(AppError::StoreNotConfigured)?;

    match store.reconnect().await {
        Ok(()) => {
            tracing::info!("Cache store reconnected");
            Ok((StatusCode::OK, success_to_api_response(store.breaker_state())))
        }
        Err(e) => {
            tracing::warn!("Cache store reconnect failed: {}", e);
            Ok((
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, format!("cache reconnect failed: {}", e)),
            ))
        }
    }
}
