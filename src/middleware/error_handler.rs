use std::time::Instant;

use axum::{
    body::{Body, to_bytes},
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};

// 日志里最多记录的错误响应体字节数
const MAX_LOGGED_BODY: usize = 4096;

pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;
    let elapsed = started.elapsed();

    if !response.status().is_server_error() {
        debug!("{} {} -> {} in {:?}", method, path, response.status(), elapsed);
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            error!("{} {} -> {}, failed to read error body: {}", method, path, parts.status, e);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let logged = &bytes[..bytes.len().min(MAX_LOGGED_BODY)];
    error!(
        "{} {} -> {} in {:?}, body ({} bytes): {}",
        method,
        path,
        parts.status,
        elapsed,
        bytes.len(),
        String::from_utf8_lossy(logged)
    );

    // 响应体原样返回
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
