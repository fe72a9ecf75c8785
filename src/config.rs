use std::{env, fmt::Display, str::FromStr};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("Unknown store backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store_backend: StoreBackend,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub allowed_origins: Vec<String>,
    pub rate_limit_per_minute: u32,
    pub max_commit_retries: u32,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub reconcile_interval_secs: u64,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let store_backend: StoreBackend = try_load("STORE_BACKEND", "redis")?;

        let redis_url = match store_backend {
            StoreBackend::Redis => Some(required("REDIS_URL")?),
            StoreBackend::Memory => env::var("REDIS_URL").ok(),
        };

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Self {
            port: try_load("PORT", "3001")?,
            store_backend,
            redis_url,
            jwt_secret: required("JWT_SECRET")?,
            allowed_origins,
            rate_limit_per_minute: try_load("RATE_LIMIT_PER_MINUTE", "1000")?,
            max_commit_retries: try_load("MAX_COMMIT_RETRIES", "5")?,
            default_page_size: try_load("DEFAULT_PAGE_SIZE", "10")?,
            max_page_size: try_load("MAX_PAGE_SIZE", "100")?,
            reconcile_interval_secs: try_load("RECONCILE_INTERVAL_SECS", "3600")?,
        };

        if config.default_page_size == 0 || config.default_page_size > config.max_page_size {
            return Err(AppError::EnvError(format!(
                "DEFAULT_PAGE_SIZE must be between 1 and MAX_PAGE_SIZE ({})",
                config.max_page_size
            )));
        }

        if config.rate_limit_per_minute == 0 {
            return Err(AppError::EnvError(
                "RATE_LIMIT_PER_MINUTE must be greater than 0".into(),
            ));
        }

        Ok(config)
    }

    /// Settings for tests and local runs against the in-memory store.
    pub fn for_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            port: 3001,
            store_backend: StoreBackend::Memory,
            redis_url: None,
            jwt_secret: jwt_secret.into(),
            allowed_origins: vec!["http://localhost:3000".into()],
            rate_limit_per_minute: 1000,
            max_commit_retries: 5,
            default_page_size: 10,
            max_page_size: 100,
            reconcile_interval_secs: 0,
        }
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::EnvError(format!("{key} must be set")))
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, AppError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        tracing::info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| AppError::EnvError(format!("Invalid {key} value: {e}")))
}
