use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::protocol::{CallToolResult, JsonRpcError, Tool, ToolContent};
use crate::AppState;
use crate::error::YapsError;
use crate::yaps::format_leaderboard;

const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

#[derive(Debug, Deserialize)]
struct GetScoreArgs {
    username: String,
}

#[derive(Debug, Deserialize)]
struct CompareArgs {
    username_a: String,
    username_b: String,
}

pub fn tool_definitions() -> Vec<Tool> {
    let username = json!({ "type": "string", "minLength": 1 });
    vec![
        Tool {
            name: "get_yaps_score".into(),
            description: "Get the YAPS attention score, percentile and label for an X/Twitter account".into(),
            input_schema: json!({
                "type": "object",
                "properties": { "username": username },
                "required": ["username"],
            }),
        },
        Tool {
            name: "compare_scores".into(),
            description: "Compare the YAPS scores of two accounts".into(),
            input_schema: json!({
                "type": "object",
                "properties": { "username_a": username, "username_b": username },
                "required": ["username_a", "username_b"],
            }),
        },
        Tool {
            name: "leaderboard_today".into(),
            description: "Top 10 tracked accounts by YAPS in the last 24 hours".into(),
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        Tool {
            name: "health_check".into(),
            description: "Server, cache and rate limiter status".into(),
            input_schema: json!({ "type": "object", "properties": {} }),
        },
    ]
}

/// 执行工具调用，参数不合法或工具不存在时返回 JSON-RPC 错误
pub async fn call_tool(
    state: &AppState,
    name: &str,
    arguments: Map<String, Value>,
) -> Result<CallToolResult, JsonRpcError> {
    match name {
        "get_yaps_score" => {
            let args: GetScoreArgs = parse_args(arguments)?;
            require_non_empty("username", &args.username)?;
            Ok(get_yaps_score(state, &args.username).await)
        }
        "compare_scores" => {
            let args: CompareArgs = parse_args(arguments)?;
            require_non_empty("username_a", &args.username_a)?;
            require_non_empty("username_b", &args.username_b)?;
            Ok(compare_scores(state, &args.username_a, &args.username_b).await)
        }
        "leaderboard_today" => Ok(leaderboard_today(state).await),
        "health_check" => Ok(health_check(state).await),
        _ => Err(JsonRpcError::invalid_params(format!("Unknown tool: {}", name))),
    }
}

async fn get_yaps_score(state: &AppState, username: &str) -> CallToolResult {
    if !state.limiter.check_limit().await {
        return CallToolResult::failure(429, RATE_LIMIT_MESSAGE);
    }
    state.limiter.increment_counter().await;

    match state.scores.get_score(username).await {
        Ok(score) => json_with_text(&score, score.summary()),
        Err(e) => {
            tracing::error!("Error in get_yaps_score for {}: {}", username, e);
            failure_for(e, "Error fetching YAPS score")
        }
    }
}

async fn compare_scores(state: &AppState, username_a: &str, username_b: &str) -> CallToolResult {
    if !state.limiter.check_limit().await {
        return CallToolResult::failure(429, RATE_LIMIT_MESSAGE);
    }
    state.limiter.increment_counter().await;

    match state.comparisons.compare(username_a, username_b).await {
        Ok(comparison) => {
            let summary = comparison.summary.clone();
            json_with_text(&comparison, summary)
        }
        Err(e) => {
            tracing::error!("Error comparing {} and {}: {}", username_a, username_b, e);
            failure_for(e, "Error comparing scores")
        }
    }
}

async fn leaderboard_today(state: &AppState) -> CallToolResult {
    let entries = state.leaderboard.get_leaderboard().await;
    json_with_text(&entries, format_leaderboard(&entries))
}

async fn health_check(state: &AppState) -> CallToolResult {
    let report = state.health().await;
    let text = format!(
        "YAPS MCP server is running ({}), cache: {}",
        report.environment, report.cache.backend
    );
    json_with_text(&report, text)
}

fn failure_for(error: YapsError, prefix: &str) -> CallToolResult {
    CallToolResult::failure(500, format!("{}: {}", prefix, error))
}

fn json_with_text<T: Serialize>(value: &T, text: String) -> CallToolResult {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CallToolResult::success(vec![ToolContent::text(json), ToolContent::text(text)]),
        Err(e) => CallToolResult::failure(500, format!("Failed to encode result: {}", e)),
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(arguments: Map<String, Value>) -> Result<T, JsonRpcError> {
    serde_json::from_value(Value::Object(arguments))
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tool arguments: {}", e)))
}

fn require_non_empty(field: &str, value: &str) -> Result<(), JsonRpcError> {
    if value.trim().is_empty() {
        return Err(JsonRpcError::invalid_params(format!("{} must not be empty", field)));
    }
    Ok(())
}
