use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// 缓存后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDriver {
    Redis,
    Memory,
}

impl FromStr for CacheDriver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(CacheDriver::Redis),
            "memory" => Ok(CacheDriver::Memory),
            other => Err(ConfigError::Invalid {
                name: "CACHE_DRIVER",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub cache_driver: CacheDriver,
    pub redis_url: String,
    pub cache_prefix: String,
    pub cache_minute_duration: u64,
    pub cache_timeout_ms: u64,
    pub cors_allow_origins: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        Ok(Config {
            app_name: var_or("APP_NAME", "user-service"),
            server_host: var_or("SERVER_HOST", "0.0.0.0"),
            server_port: parse_or("SERVER_PORT", 3000),
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 20),
            cache_driver: var_or("CACHE_DRIVER", "redis").parse()?,
            redis_url: var_or("REDIS_URL", "redis://127.0.0.1:6379"),
            cache_prefix: var_or("CACHE_PREFIX", ""),
            // 默认缓存 5 分钟
            cache_minute_duration: parse_or("CACHE_MINUTE_DURATION", 5),
            cache_timeout_ms: parse_or("CACHE_TIMEOUT_MS", 500),
            cors_allow_origins: var_or("CORS_ALLOW_ORIGINS", "*"),
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_minute_duration.saturating_mul(60))
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    /// CORS 允许的来源；`*` 表示全部
    pub fn cors_origins(&self) -> Option<Vec<String>> {
        parse_origins(&self.cors_allow_origins)
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_origins(raw: &str) -> Option<Vec<String>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "*" {
        return None;
    }
    Some(
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_driver_parses_case_insensitively() {
        assert_eq!("Redis".parse::<CacheDriver>().unwrap(), CacheDriver::Redis);
        assert_eq!(" memory ".parse::<CacheDriver>().unwrap(), CacheDriver::Memory);
        assert!("memcached".parse::<CacheDriver>().is_err());
    }

    #[test]
    fn wildcard_origins_allow_everything() {
        assert_eq!(parse_origins("*"), None);
        assert_eq!(parse_origins(""), None);
        assert_eq!(
            parse_origins("https://a.example, https://b.example"),
            Some(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
    }

    fn config() -> Config {
        Config {
            app_name: "test".into(),
            server_host: "127.0.0.1".into(),
            server_port: 3000,
            database_url: "postgres://localhost/test".into(),
            database_max_connections: 5,
            cache_driver: CacheDriver::Memory,
            redis_url: String::new(),
            cache_prefix: "test:".into(),
            cache_minute_duration: 5,
            cache_timeout_ms: 250,
            cors_allow_origins: "*".into(),
        }
    }

    #[test]
    fn durations_are_derived_from_minutes_and_millis() {
        let config = config();

        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.cache_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn oversized_ttl_saturates() {
        let config = Config {
            cache_minute_duration: u64::MAX,
            ..config()
        };

        assert_eq!(config.cache_ttl(), Duration::from_secs(u64::MAX));
    }
}
