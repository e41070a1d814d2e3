/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, DB 接続情報, 署名シークレット, CORS 許可など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
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

/// Which document store backend the process talks to.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Postgres { database_url: String },
    Memory,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // database_url carries the password
        match self {
            StoreConfig::Postgres { .. } => f.write_str("Postgres { .. }"),
            StoreConfig::Memory => f.write_str("Memory"),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub store: StoreConfig,

    pub access_token_secret: String,
    pub access_token_ttl_seconds: u64,
    pub access_token_leeway_seconds: u64,

    pub http_body_limit_bytes: usize,
    pub http_timeout_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the signing secret
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("store", &self.store)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("access_token_leeway_seconds", &self.access_token_leeway_seconds)
            .field("http_body_limit_bytes", &self.http_body_limit_bytes)
            .field("http_timeout_seconds", &self.http_timeout_seconds)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV"));

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let store = match var("STORE_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => StoreConfig::Memory,
            "postgres" => StoreConfig::Postgres {
                database_url: database_url(&var)?,
            },
            _ => return Err(ConfigError::Invalid("STORE_BACKEND")),
        };

        let access_token_secret = var("ACCESS_TOKEN_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("ACCESS_TOKEN_SECRET"))?;

        let access_token_ttl_seconds = match var("ACCESS_TOKEN_TTL_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"))?,
            None => 86_400, // 1 day
        };

        let access_token_leeway_seconds = var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);

        let http_body_limit_bytes =
            positive(&var, "HTTP_BODY_LIMIT_BYTES")?.unwrap_or(1024 * 1024);
        let http_timeout_seconds = positive(&var, "HTTP_TIMEOUT_SECONDS")?.unwrap_or(30);

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            store,
            access_token_secret,
            access_token_ttl_seconds,
            access_token_leeway_seconds,
            http_body_limit_bytes,
            http_timeout_seconds,
        })
    }
}

// Unset → None; set but not a positive integer → Invalid(key).
fn positive<F, T>(var: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Default + PartialOrd,
{
    match var(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .ok()
            .filter(|v| *v > T::default())
            .map(Some)
            .ok_or(ConfigError::Invalid(key)),
    }
}

// DATABASE_URL wins; otherwise assemble one from DB_USER / DB_PASS / DB_HOST / DB_NAME.
fn database_url<F>(var: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = var("DATABASE_URL").filter(|s| !s.is_empty()) {
        return Ok(url);
    }

    let user = var("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
    let pass = var("DB_PASS").ok_or(ConfigError::Missing("DB_PASS"))?;
    let host = var("DB_HOST").unwrap_or_else(|| "localhost:5432".to_string());
    let name = var("DB_NAME").unwrap_or_else(|| "warehouse".to_string());

    let mut url = Url::parse(&format!("postgres://{}/{}", host, name))
        .map_err(|_| ConfigError::Invalid("DB_HOST"))?;
    // set_username/set_password percent-encode reserved characters
    url.set_username(&user)
        .map_err(|_| ConfigError::Invalid("DB_USER"))?;
    url.set_password(Some(&pass))
        .map_err(|_| ConfigError::Invalid("DB_PASS"))?;

    Ok(url.to_string())
}
