/// 서비스 설정
/// 환경 변수에서 읽는다.
/// - DATABASE_URL: 지정 시 PostgreSQL 저장소, 없으면 메모리 저장소
/// - DATABASE_MAX_CONNECTIONS: 커넥션 풀 크기 (기본 5)
/// - BIND_ADDR: 웹 서버 주소 (기본 0.0.0.0:3000)
/// - SYNC_INTERVAL_MS: 동기화 루프 주기 (기본 1000ms)
// region:    --- Imports
use std::time::Duration;

// endregion: --- Imports

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SYNC_INTERVAL_MS: u64 = 1000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// region:    --- Config
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("잘못된 환경 변수 값: {name}={value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub bind_addr: String,
    pub sync_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            sync_interval: Duration::from_millis(DEFAULT_SYNC_INTERVAL_MS),
        }
    }
}

impl Config {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let bind_addr = lookup("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "DATABASE_MAX_CONNECTIONS",
                    value,
                })?,
            None => defaults.max_connections,
        };

        let sync_interval = match lookup("SYNC_INTERVAL_MS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .ok_or(ConfigError::InvalidValue {
                    name: "SYNC_INTERVAL_MS",
                    value,
                })?,
            None => defaults.sync_interval,
        };

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            sync_interval,
        })
    }
}

// endregion: --- Config

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.sync_interval, Duration::from_secs(1));
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_overrides_from_env() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/market"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("SYNC_INTERVAL_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/market")
        );
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.sync_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = Config::from_lookup(lookup_from(&[("SYNC_INTERVAL_MS", "0")])).unwrap_err();
        assert!(err.to_string().contains("SYNC_INTERVAL_MS"));
    }
}
// endregion: --- Tests
