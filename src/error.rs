use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::utils::{ApiResponse, error_codes};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(String),

    #[error("invalid value {value:?} for {var}")]
    Invalid { var: String, value: String },
}

/// 缓存层错误，只在内部使用，调用方一律当作缓存缺失处理
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache store unavailable")]
    Unavailable,

    #[error("cache operation timed out")]
    Timeout,

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("value at {0} is not an integer")]
    NotAnInteger(String),
}

/// 积分查询相关错误
#[derive(Debug, Error)]
pub enum YapsError {
    #[error("Failed to fetch YAPS score for {username}")]
    Fetch { username: String, reason: String },

    #[error("username must not be empty")]
    InvalidHandle,
}

/// HTTP 运维接口错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error("cache store not configured")]
    StoreNotConfigured,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            AppError::StoreNotConfigured => (StatusCode::CONFLICT, error_codes::STORE_NOT_CONFIGURED),
        };

        let body = Json(ApiResponse::<()> {
            code,
            msg: self.to_string(),
            resp_data: None,
        });

        (status, body).into_response()
    }
}
