use anyhow::Result;
use config::{Config, Environment, File};
use moka::future::Cache;
use sea_orm::Database;
use serde::Deserialize;
use std::{fmt, sync::Arc, time::Duration};

use crate::mailer::LogMailer;
use crate::schemas::AppState;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://nsstrack.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";
pub const DEFAULT_JWT_SECRET: &str = "nsstrack-development-secret";

/// Runtime configuration.
///
/// Loaded from built-in defaults, then an optional `nsstrack.toml` in the
/// working directory, then `NSS_*` environment variables
/// (e.g. `NSS_DATABASE_URL`, `NSS_JWT_SECRET`).
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    /// HMAC key for session and password reset tokens
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub reset_token_ttl_minutes: i64,
    pub report_cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    /// PBKDF2 rounds for newly hashed passwords
    pub password_iterations: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_hours: 24,
            reset_token_ttl_minutes: 60,
            report_cache_ttl_secs: 300,
            request_timeout_secs: 30,
            password_iterations: 100_000,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("reset_token_ttl_minutes", &self.reset_token_ttl_minutes)
            .field("report_cache_ttl_secs", &self.report_cache_ttl_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("password_iterations", &self.password_iterations)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from `.env`, `nsstrack.toml` and the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = AppConfig::default();
        let settings = Config::builder()
            .set_default("database_url", defaults.database_url)?
            .set_default("bind_address", defaults.bind_address)?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("token_ttl_hours", defaults.token_ttl_hours)?
            .set_default("reset_token_ttl_minutes", defaults.reset_token_ttl_minutes)?
            .set_default("report_cache_ttl_secs", defaults.report_cache_ttl_secs as i64)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("password_iterations", i64::from(defaults.password_iterations))?
            .add_source(File::with_name("nsstrack").required(false))
            .add_source(Environment::with_prefix("NSS"))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        if config.jwt_secret == DEFAULT_JWT_SECRET {
            tracing::warn!("NSS_JWT_SECRET is not set; using the development secret");
        }
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Connect to the database and build the shared application state.
pub async fn initialize_app_state(config: AppConfig) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url).await?;

    let cache = Cache::builder()
        .max_capacity(1000)
        .time_to_live(Duration::from_secs(config.report_cache_ttl_secs))
        .build();

    Ok(AppState {
        db,
        cache,
        config: Arc::new(config),
        mailer: Arc::new(LogMailer),
        report_generation: Arc::default(),
    })
}
