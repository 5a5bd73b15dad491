use serde::{Deserialize, Serialize};

use crate::{HealthReport, rate_limit::RateLimitUsage};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub server: &'static str,
    pub port: u16,
    pub endpoint: String,
    pub health: HealthReport,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub limiter: &'static str,
    pub usage: RateLimitUsage,
}
