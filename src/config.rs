use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::crypto::DEFAULT_TOKEN_TTL_DAYS;
use crate::db::PoolSettings;

const DEV_JWT_SECRET: &str = "dev-only-jwt-secret-change-me-min-256-bits";

/// Process configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub pool: PoolSettings,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
    pub allowed_origins: Vec<String>,
    pub upload_folder: PathBuf,
    pub max_file_size: u64,
    pub environment: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = get("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None if environment == "development" => DEV_JWT_SECRET.to_string(),
            None => bail!("JWT_SECRET must be set when ENVIRONMENT={}", environment),
        };

        let pool = PoolSettings {
            min_connections: parse_or(&get, "DB_POOL_MIN", 1)?,
            max_connections: parse_or(&get, "DB_POOL_MAX", 10)?,
            command_timeout: Duration::from_secs(parse_or(&get, "DB_COMMAND_TIMEOUT_SECS", 60)?),
        };
        if pool.min_connections > pool.max_connections {
            bail!(
                "DB_POOL_MIN ({}) exceeds DB_POOL_MAX ({})",
                pool.min_connections,
                pool.max_connections
            );
        }

        let bcrypt_cost = parse_or(&get, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31, got {}", bcrypt_cost);
        }

        let token_ttl_days: i64 =
            parse_or(&get, "ACCESS_TOKEN_EXPIRE_DAYS", DEFAULT_TOKEN_TTL_DAYS)?;
        if token_ttl_days <= 0 {
            bail!(
                "ACCESS_TOKEN_EXPIRE_DAYS must be positive, got {}",
                token_ttl_days
            );
        }
        let token_ttl = chrono::Duration::try_days(token_ttl_days).with_context(|| {
            format!("ACCESS_TOKEN_EXPIRE_DAYS out of range: {}", token_ttl_days)
        })?;

        let allowed_origins = get("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            api_host: get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            api_port: parse_or(&get, "API_PORT", 8000)?,
            database_url: get("DATABASE_URL"),
            pool,
            jwt_secret,
            token_ttl,
            bcrypt_cost,
            allowed_origins,
            upload_folder: get("UPLOAD_FOLDER")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./uploads")),
            max_file_size: parse_or(&get, "MAX_FILE_SIZE", 10 * 1024 * 1024)?,
            environment,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
