use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub cors_origin: String,
    pub secure_cookies: bool,
    pub cleaner: CleanerConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct CleanerConfig {
    pub interval: Duration,
    pub batch_size: i64,
    pub pause: Duration,
    /// Sweep once right after start-up instead of waiting a full interval.
    pub run_on_start: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
            batch_size: 100,
            pause: Duration::from_millis(100),
            run_on_start: true,
        }
    }
}

impl AppConfig {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self> {
        if dotenv::dotenv().is_err() {
            log::info!("No .env file found, using process environment");
        }

        let defaults = CleanerConfig::default();
        let cleaner = CleanerConfig {
            interval: Duration::from_secs(parse_var(
                "CLEANER_INTERVAL_SECS",
                defaults.interval.as_secs(),
            )?),
            batch_size: parse_var("CLEANER_BATCH_SIZE", defaults.batch_size)?,
            pause: Duration::from_millis(parse_var(
                "CLEANER_PAUSE_MS",
                defaults.pause.as_millis() as u64,
            )?),
            run_on_start: parse_var("CLEANER_RUN_ON_START", defaults.run_on_start)?,
        };

        if cleaner.batch_size <= 0 {
            anyhow::bail!("CLEANER_BATCH_SIZE must be positive");
        }
        if cleaner.interval.is_zero() {
            anyhow::bail!("CLEANER_INTERVAL_SECS must be positive");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "flashdeck.db".into()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            secure_cookies: parse_var("SECURE_COOKIES", false)?,
            cleaner,
        })
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}
