use std::env;
use std::net::IpAddr;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_YAPS_API_ENDPOINT: &str = "https://api.kaito.ai/api/v1/yaps";

// 缓存过期时间和限流窗口的上限，一年
const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

// 排行榜默认跟踪的账号
const DEFAULT_TRACKED_ACCOUNTS: [&str; 20] = [
    "VitalikButerin",
    "saylor",
    "elonmusk",
    "cz_binance",
    "balajis",
    "SBF_FTX",
    "cdixon",
    "aantonop",
    "brian_armstrong",
    "tyler",
    "cameron",
    "gabusch",
    "CryptoHayes",
    "Excellion",
    "SatoshiLite",
    "APompliano",
    "CharlieShrem",
    "rogerkver",
    "adam3us",
    "cryptograffiti",
];

/// 缓存后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    Memory,
    None,
}

/// 运行环境
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub yaps_api_endpoint: String,
    pub yaps_api_timeout_secs: u64,
    pub redis_url: Option<String>,
    pub cache_backend: CacheBackend,
    pub redis_connect_timeout_ms: u64,
    pub redis_connect_retries: u32,
    pub redis_recheck_secs: u64,
    pub server_host: IpAddr,
    pub server_port: u16,
    pub environment: Environment,
    pub score_cache_ttl_secs: u64,
    pub leaderboard_cache_ttl_secs: u64,
    pub rate_limit_requests: u32,
    pub rate_limit_window_minutes: u64,
    pub leaderboard_request_delay_ms: u64,
    pub leaderboard_refresh_secs: u64,
    pub tracked_accounts: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源构建配置，测试时不必修改进程环境变量
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let yaps_api_endpoint =
            var("YAPS_API_ENDPOINT").unwrap_or_else(|| DEFAULT_YAPS_API_ENDPOINT.to_string());
        if reqwest::Url::parse(&yaps_api_endpoint)
            .map(|url| !matches!(url.scheme(), "http" | "https"))
            .unwrap_or(true)
        {
            return Err(ConfigError::Invalid {
                var: "YAPS_API_ENDPOINT".into(),
                value: yaps_api_endpoint,
            });
        }

        let redis_url = var("REDIS_URL");
        let cache_backend = match var("CACHE_BACKEND") {
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "redis" => CacheBackend::Redis,
                "memory" => CacheBackend::Memory,
                "none" => CacheBackend::None,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "CACHE_BACKEND".into(),
                        value,
                    });
                }
            },
            None if redis_url.is_some() => CacheBackend::Redis,
            None => CacheBackend::None,
        };
        if cache_backend == CacheBackend::Redis && redis_url.is_none() {
            return Err(ConfigError::Missing("REDIS_URL".into()));
        }

        // NODE_ENV 兼容旧部署
        let environment = match var("APP_ENV").or_else(|| var("NODE_ENV")) {
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "development" => Environment::Development,
                "production" => Environment::Production,
                "test" => Environment::Test,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "APP_ENV".into(),
                        value,
                    });
                }
            },
            None => Environment::Development,
        };

        let tracked_accounts = match var("TRACKED_ACCOUNTS") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().trim_start_matches('@').to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_TRACKED_ACCOUNTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        // 只接受 IP 地址，主机名不做解析
        let host = var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_host = match host.trim().parse::<IpAddr>() {
            Ok(ip) => ip,
            Err(_) => {
                return Err(ConfigError::Invalid {
                    var: "SERVER_HOST".into(),
                    value: host,
                });
            }
        };

        Ok(Config {
            yaps_api_endpoint,
            yaps_api_timeout_secs: parse_in_range(&var, "YAPS_API_TIMEOUT_SECS", 10, 1..=3600)?,
            redis_url,
            cache_backend,
            redis_connect_timeout_ms: parse_in_range(&var, "REDIS_CONNECT_TIMEOUT_MS", 500, 1..=60_000)?,
            redis_connect_retries: parse_or(&var, "REDIS_CONNECT_RETRIES", 3)?,
            redis_recheck_secs: parse_or(&var, "REDIS_RECHECK_SECS", 30)?,
            server_host,
            server_port: parse_or(&var, "PORT", 3000)?,
            environment,
            score_cache_ttl_secs: parse_in_range(&var, "YAPS_CACHE_TTL", 300, 1..=MAX_TTL_SECS)?,
            leaderboard_cache_ttl_secs: parse_in_range(
                &var,
                "LEADERBOARD_CACHE_TTL",
                3600,
                1..=MAX_TTL_SECS,
            )?,
            rate_limit_requests: parse_or(&var, "RATE_LIMIT_MAX_REQUESTS", 100)?,
            rate_limit_window_minutes: parse_in_range(
                &var,
                "RATE_LIMIT_WINDOW_MINUTES",
                5,
                1..=MAX_TTL_SECS / 60,
            )?,
            leaderboard_request_delay_ms: parse_or(&var, "LEADERBOARD_REQUEST_DELAY_MS", 100)?,
            leaderboard_refresh_secs: parse_or(&var, "LEADERBOARD_REFRESH_SECS", 0)?,
            tracked_accounts,
        })
    }

    pub fn yaps_api_timeout(&self) -> Duration {
        Duration::from_secs(self.yaps_api_timeout_secs)
    }

    pub fn redis_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.redis_connect_timeout_ms)
    }

    pub fn redis_recheck_interval(&self) -> Duration {
        Duration::from_secs(self.redis_recheck_secs)
    }

    pub fn leaderboard_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.leaderboard_cache_ttl_secs)
    }

    pub fn leaderboard_request_delay(&self) -> Duration {
        Duration::from_millis(self.leaderboard_request_delay_ms)
    }

    pub fn leaderboard_refresh_interval(&self) -> Option<Duration> {
        (self.leaderboard_refresh_secs > 0).then(|| Duration::from_secs(self.leaderboard_refresh_secs))
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

/// 解析整数并要求落在范围内
fn parse_in_range<F>(
    var: &F,
    key: &str,
    default: u64,
    range: RangeInclusive<u64>,
) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(var, key, default)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            var: key.to_string(),
            value: value.to_string(),
        })
    }
}
