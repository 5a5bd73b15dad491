mod common;

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use yaps_mcp::error::YapsError;
use yaps_mcp::yaps::{ScoreUpstream, YapsApiClient};

// 本地假上游，按用户名返回不同的响应
async fn fake_yaps(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("username").map(String::as_str) {
        Some("alice") => Json(json!({
            "user_id": 42,
            "username": "alice",
            "yaps_all": 1200.5,
            "yaps_l24h": 10.0,
            "yaps_l7d": 80.0,
            "yaps_l30d": 300.0,
        }))
        .into_response(),
        Some("negative") => Json(json!({
            "user_id": "n",
            "yaps_all": 1.0,
            "yaps_l24h": -1.0,
            "yaps_l7d": 1.0,
            "yaps_l30d": 1.0,
        }))
        .into_response(),
        Some("garbled") => (StatusCode::OK, "not json").into_response(),
        Some("slow") => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            StatusCode::OK.into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/api/yaps", get(fake_yaps));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api/yaps", addr)
}

async fn client(timeout: Duration) -> YapsApiClient {
    common::init_test_env();
    YapsApiClient::new(spawn_upstream().await, timeout).unwrap()
}

fn reason(err: YapsError) -> String {
    match err {
        YapsError::Fetch { reason, .. } => reason,
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn fetches_and_decodes_score() {
    let client = client(Duration::from_secs(2)).await;
    let raw = client.fetch("alice").await.unwrap();

    assert_eq!(raw.user_id, "42");
    assert_eq!(raw.yaps_all, 1200.5);
    assert_eq!(raw.yaps_l30d, 300.0);
}

#[tokio::test]
async fn non_ok_status_is_a_fetch_error() {
    let client = client(Duration::from_secs(2)).await;
    let err = client.fetch("nobody").await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to fetch YAPS score for nobody");
    assert!(reason(err).contains("404"));
}

#[tokio::test]
async fn invalid_payloads_are_rejected() {
    let client = client(Duration::from_secs(2)).await;

    assert!(matches!(client.fetch("garbled").await, Err(YapsError::Fetch { .. })));
    let err = client.fetch("negative").await.unwrap_err();
    assert!(reason(err).contains("yaps_l24h"));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let client = client(Duration::from_millis(200)).await;
    let started = std::time::Instant::now();

    assert!(matches!(client.fetch("slow").await, Err(YapsError::Fetch { .. })));
    assert!(started.elapsed() < Duration::from_secs(4));
}
