use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, header};

use super::model::UpstreamScore;
use crate::config::Config;
use crate::error::YapsError;

/// 上游积分接口
#[async_trait]
pub trait ScoreUpstream: Send + Sync {
    /// `username` 已经规范化
    async fn fetch(&self, username: &str) -> Result<UpstreamScore, YapsError>;
}

/// Kaito YAPS HTTP 客户端
#[derive(Debug, Clone)]
pub struct YapsApiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl YapsApiClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(config.yaps_api_endpoint.clone(), config.yaps_api_timeout())
    }
}

#[async_trait]
impl ScoreUpstream for YapsApiClient {
    async fn fetch(&self, username: &str) -> Result<UpstreamScore, YapsError> {
        let fail = |reason: String| YapsError::Fetch {
            username: username.to_string(),
            reason,
        };

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("username", username)])
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(fail(format!("upstream returned {}", status)));
        }

        let raw: UpstreamScore = response.json().await.map_err(|e| fail(e.to_string()))?;
        raw.validate().map_err(fail)?;
        Ok(raw)
    }
}
