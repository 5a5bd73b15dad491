use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yaps_mcp::{
    AppState,
    cache::store_for,
    config::Config,
    mcp::{McpHandler, serve_stdio},
    routes,
    yaps::YapsApiClient,
};

#[tokio::main]
async fn main() -> ExitCode {
    let use_stdio = std::env::args().any(|arg| arg == "--stdio");

    // 初始化日志，stdio 模式下 stdout 用于协议消息
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // 加载配置
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = match store_for(&config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to create cache store: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(store) = &store {
        // 启动时连不上只记录，运行中由熔断器重试
        if let Err(e) = store.ping().await {
            tracing::warn!("Cache store not reachable at startup: {}", e);
        }
    }

    let upstream = match YapsApiClient::from_config(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!("Failed to build upstream client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        "Starting YAPS MCP server ({}), cache backend: {:?}, tracking {} accounts",
        config.environment.as_str(),
        config.cache_backend,
        config.tracked_accounts.len()
    );

    let state = AppState::new(config, upstream, store);

    if let Some(interval) = state.config.leaderboard_refresh_interval() {
        tracing::info!("Scheduling leaderboard refresh every {:?}", interval);
        state.leaderboard.clone().spawn_refresh_task(interval);
    }

    let result = if use_stdio {
        run_stdio(state).await
    } else {
        run_http(state).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Error running MCP server: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_stdio(state: AppState) -> std::io::Result<()> {
    tracing::info!("Starting MCP server with stdio transport");
    let handler = McpHandler::new(state);
    tokio::select! {
        result = serve_stdio(handler) => result,
        _ = shutdown_signal() => Ok(()),
    }
}

async fn run_http(state: AppState) -> std::io::Result<()> {
    let addr = SocketAddr::new(state.config.server_host, state.config.server_port);

    let listener = tokio::net::TcpListener::bind(&addr).await.inspect_err(|e| {
        if e.kind() == std::io::ErrorKind::AddrInUse {
            tracing::error!("Port {} is already in use", addr.port());
        }
    })?;

    let app = routes::create_router(state);
    tracing::info!("MCP HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down YAPS MCP server...");
}
