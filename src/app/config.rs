use std::{env, net::SocketAddr, time::Duration};

use tracing::Level;

use crate::{auth::jwt::JwtConfig, error::AppError};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_SERVICE_NAME: &str = "roadmap-feedback-api";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub format: LogFormat,
    pub level: Level,
}

impl LogSettings {
    pub fn from_env() -> Self {
        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let level = match env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::TRACE,
            Ok("debug") => Level::DEBUG,
            Ok("warn") => Level::WARN,
            Ok("error") => Level::ERROR,
            _ => Level::INFO,
        };

        Self { format, level }
    }
}

#[derive(Debug, Clone)]
pub struct OtelSettings {
    pub endpoint: String,
    pub service_name: String,
}

impl OtelSettings {
    pub fn from_env() -> Option<Self> {
        let endpoint = read_env_string("OTEL_EXPORTER_OTLP_ENDPOINT")?;
        let service_name = read_env_string("OTEL_SERVICE_NAME")
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());

        Some(Self {
            endpoint,
            service_name,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone)]
pub enum StorageBackend {
    Postgres(DatabaseSettings),
    Memory,
}

/// Per-client-IP token bucket: `burst` requests up front, one more every
/// `replenish_every`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub burst: u32,
    pub replenish_every: Duration,
}

#[derive(Clone)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub storage: StorageBackend,
    pub jwt: JwtConfig,
    pub cors_origin: Option<String>,
    pub rate_limit: Option<RateLimitSettings>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let port = read_env_u16("PORT").unwrap_or(DEFAULT_PORT);
        let storage = match env::var("STORAGE_BACKEND").as_deref() {
            Ok("memory") => StorageBackend::Memory,
            Ok("postgres") | Err(_) => StorageBackend::Postgres(database_from_env()?),
            Ok(other) => {
                return Err(AppError::Internal(format!(
                    "unknown STORAGE_BACKEND: {}",
                    other
                )));
            }
        };

        let jwt_secret = read_env_string("JWT_SECRET")
            .ok_or_else(|| AppError::Internal("JWT_SECRET missing".to_string()))?;

        let rate_limit = match read_env_bool("RATE_LIMIT_ENABLED").unwrap_or(true) {
            true => Some(RateLimitSettings {
                burst: read_env_u32("RATE_LIMIT_BURST")
                    .filter(|value| *value > 0)
                    .unwrap_or(100),
                replenish_every: Duration::from_secs(
                    read_env_u64("RATE_LIMIT_REPLENISH_SECS")
                        .filter(|value| *value > 0)
                        .unwrap_or(9),
                ),
            }),
            false => None,
        };

        Ok(Self {
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            storage,
            jwt: JwtConfig::from_env(jwt_secret),
            cors_origin: read_env_string("CORS_ORIGIN").filter(|value| value != "*"),
            rate_limit,
        })
    }
}

fn database_from_env() -> Result<DatabaseSettings, AppError> {
    let url = read_env_string("DATABASE_URL")
        .ok_or_else(|| AppError::Internal("DATABASE_URL missing".to_string()))?;

    Ok(DatabaseSettings {
        url,
        max_connections: read_env_u32("DATABASE_MAX_CONNECTIONS").unwrap_or(20),
        min_connections: read_env_u32("DATABASE_MIN_CONNECTIONS").unwrap_or(5),
        acquire_timeout: Duration::from_secs(
            read_env_u64("DATABASE_ACQUIRE_TIMEOUT_SECS").unwrap_or(15),
        ),
    })
}

pub(crate) fn read_env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn read_env_u16(key: &str) -> Option<u16> {
    read_env_string(key).and_then(|value| value.parse::<u16>().ok())
}

fn read_env_u32(key: &str) -> Option<u32> {
    read_env_string(key).and_then(|value| value.parse::<u32>().ok())
}

fn read_env_u64(key: &str) -> Option<u64> {
    read_env_string(key).and_then(|value| value.parse::<u64>().ok())
}

fn read_env_bool(key: &str) -> Option<bool> {
    match read_env_string(key)?.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
