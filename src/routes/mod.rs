pub mod mcp;
pub mod status;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::{AppState, config::Environment, middleware::log_errors};

// 运维接口
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(status::status))
        .route("/rate-limit/reset", post(status::rate_limit_reset))
        .route("/cache/reconnect", post(status::reconnect_cache))
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(status::health))
        .route("/mcp", post(mcp::handle_mcp))
        .nest("/api", api_routes())
        .layer(axum::middleware::from_fn(log_errors));

    // 非生产环境允许跨域
    let router = if state.config.environment == Environment::Production {
        router
    } else {
        tracing::debug!("Adding permissive CORS layer");
        router.layer(CorsLayer::permissive())
    };

    router.with_state(state)
}
