/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, PORT, pool sizing, request timeout)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 * - pool sizing は未指定なら None のまま (sqlx のデフォルトに任せる)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Connection pool settings. Only `url` is required.
#[derive(Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout: Option<Duration>,
}

// The url carries credentials.
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub db: DbConfig,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let db = DbConfig {
            url,
            max_connections: optional(
                "DB_MAX_CONNECTIONS",
                std::env::var("DB_MAX_CONNECTIONS").ok(),
            )?,
            min_connections: optional(
                "DB_MIN_CONNECTIONS",
                std::env::var("DB_MIN_CONNECTIONS").ok(),
            )?,
            acquire_timeout: optional::<u64>(
                "DB_ACQUIRE_TIMEOUT_SECONDS",
                std::env::var("DB_ACQUIRE_TIMEOUT_SECONDS").ok(),
            )?
            .map(Duration::from_secs),
        };

        let request_timeout = optional::<u64>(
            "REQUEST_TIMEOUT_SECONDS",
            std::env::var("REQUEST_TIMEOUT_SECONDS").ok(),
        )?
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(30));

        Ok(Self {
            addr,
            app_env,
            db,
            request_timeout,
        })
    }
}

// Unset (or blank) -> None. Set but unparsable -> Invalid, never a silent default.
fn optional<T: FromStr>(key: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| ConfigError::Invalid(key)),
    }
}
