use axum::Json;
use serde::{Deserialize, Serialize};

/// 运维接口统一响应结构
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resp_data: Option<T>,
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: error_codes::SUCCESS,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const STORE_NOT_CONFIGURED: i32 = 1006;
    pub const INTERNAL_ERROR: i32 = 5000;
}

/// 去掉用户名前面的单个 "@"
pub fn normalize_username(handle: &str) -> &str {
    handle.strip_prefix('@').unwrap_or(handle)
}
