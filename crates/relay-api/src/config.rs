//! Process configuration, read once at startup.
//!
//! `Settings` is an immutable value handed to whatever needs it; there is no
//! global cache.

use crate::error::AppError;

/// Resolved configuration for the relay service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Storage connection string.
    pub database_url: String,
    /// Downstream relay target; `None` disables relay.
    pub target_url: Option<String>,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// OTLP/gRPC collector for span export, if any.
    pub otlp_endpoint: Option<String>,
}

impl Settings {
    /// Default bind host.
    pub const DEFAULT_HOST: &'static str = "0.0.0.0";
    /// Default bind port.
    pub const DEFAULT_PORT: u16 = 8000;
    /// Default storage connection string.
    pub const DEFAULT_DATABASE_URL: &'static str = "sqlite://data/app.db";
    /// Default log level.
    pub const DEFAULT_LOG_LEVEL: &'static str = "info";

    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `APP_PORT` is not a valid port.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let port = match non_blank("APP_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("APP_PORT must be a valid u16: {e}")))?,
            None => Self::DEFAULT_PORT,
        };

        Ok(Self {
            host: non_blank("APP_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_owned()),
            port,
            database_url: non_blank("DATABASE_URL")
                .unwrap_or_else(|| Self::DEFAULT_DATABASE_URL.to_owned()),
            target_url: non_blank("TARGET_URL"),
            log_level: non_blank("LOG_LEVEL")
                .map_or_else(|| Self::DEFAULT_LOG_LEVEL.to_owned(), |l| l.to_lowercase()),
            otlp_endpoint: non_blank("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}
