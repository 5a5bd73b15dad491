use super::protocol::{JsonRpcError, ReadResourceResult, ResourceContents, ResourceTemplate};
use crate::AppState;

const SCORE_URI_SCHEME: &str = "yaps-score://";

pub fn resource_templates() -> Vec<ResourceTemplate> {
    vec![ResourceTemplate {
        uri_template: format!("{}{{username}}", SCORE_URI_SCHEME),
        name: "yaps-score".into(),
        description: "YAPS score for an X/Twitter account".into(),
        mime_type: "application/json".into(),
    }]
}

/// 从 `yaps-score://{username}` 中取出用户名
pub fn username_from_uri(uri: &str) -> Option<&str> {
    uri.strip_prefix(SCORE_URI_SCHEME)
        .map(|rest| rest.trim_end_matches('/'))
        .filter(|name| !name.is_empty())
}

pub async fn read_resource(state: &AppState, uri: &str) -> Result<ReadResourceResult, JsonRpcError> {
    let username = username_from_uri(uri)
        .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown resource: {}", uri)))?;

    if !state.limiter.check_limit().await {
        return Err(JsonRpcError::rate_limited(
            "Rate limit exceeded. Please try again later.",
        ));
    }
    state.limiter.increment_counter().await;

    let score = state.scores.get_score(username).await.map_err(|e| {
        tracing::error!("Error fetching YAPS score for {}: {}", username, e);
        JsonRpcError::internal_error(e.to_string())
    })?;
    let text = serde_json::to_string(&score)
        .map_err(|e| JsonRpcError::internal_error(e.to_string()))?;

    Ok(ReadResourceResult {
        contents: vec![ResourceContents {
            uri: uri.to_string(),
            mime_type: "application/json".into(),
            text,
        }],
    })
}
