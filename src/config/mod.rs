/// 서비스 설정
/// 프로세스 시작 시 한 번만 환경 변수에서 읽고, 이후에는 각 컴포넌트 생성자로 전달한다.
// region:    --- Imports
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Config Error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("{name} must be {expected} (got {value:?})")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

// endregion: --- Config Error

// region:    --- Config
/// 데이터베이스 연결 설정
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// 행 잠금 대기 제한 시간
    pub lock_timeout: Duration,
    pub statement_timeout: Duration,
}

/// 전체 서비스 설정
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub registry_service_url: String,
    pub payment_service_url: String,
    pub service_name: String,
    pub service_port: u16,
    /// 레지스트리에 등록되는 외부 주소
    pub service_address: String,
    pub upstream_timeout: Duration,
}

impl Config {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 임의의 조회 함수로 설정 로드
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = required(&lookup, "DATABASE_URL")?;
        let registry_service_url = required(&lookup, "REGISTRY_SERVICE_URL")?;
        let payment_service_url = required(&lookup, "PAYMENT_SERVICE_URL")?;

        let port_raw = required(&lookup, "SERVICE_PORT")?;
        let service_port = match port_raw.trim().parse::<u16>() {
            Ok(port) if port > 0 => port,
            _ => {
                return Err(ConfigError::Invalid {
                    name: "SERVICE_PORT",
                    expected: "an integer between 1 and 65535",
                    value: port_raw,
                })
            }
        };

        let service_host = optional(&lookup, "SERVICE_HOST")
            .unwrap_or_else(|| "auction-service".to_string());
        let service_name =
            optional(&lookup, "SERVICE_NAME").unwrap_or_else(|| "AuctionService".to_string());

        let database = DatabaseConfig {
            url: database_url,
            max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            acquire_timeout: Duration::from_secs(parsed(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 5)?),
            lock_timeout: Duration::from_millis(parsed(&lookup, "DB_LOCK_TIMEOUT_MS", 5000)?),
            statement_timeout: Duration::from_millis(parsed(
                &lookup,
                "DB_STATEMENT_TIMEOUT_MS",
                10_000,
            )?),
        };

        Ok(Self {
            database,
            registry_service_url: trim_trailing_slash(registry_service_url),
            payment_service_url: trim_trailing_slash(payment_service_url),
            service_name,
            service_port,
            service_address: format!("http://{}:{}", service_host, service_port),
            upstream_timeout: Duration::from_secs(parsed(&lookup, "UPSTREAM_TIMEOUT_SECS", 5)?),
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or(ConfigError::Missing(name))
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.trim().is_empty())
}

fn parsed<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = optional(lookup, name) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::Invalid {
            name,
            expected: "a positive integer",
            value: raw,
        }),
    }
}

fn trim_trailing_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

// endregion: --- Config
