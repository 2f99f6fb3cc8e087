//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use quoteflow_core::PayloadShape;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// Webhook used when `UPSTREAM_WEBHOOK_URL` is not set.
pub const DEFAULT_UPSTREAM_WEBHOOK_URL: &str =
    "https://sensei07.app.n8n.cloud/webhook-test/get-quote";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub upstream_webhook_url: String,
    pub payload_shape: PayloadShape,
    pub cors_origin: String,
    /// Base URL the `quoteflow` client uses to reach this server.
    pub api_url: String,
    /// File backing the `quoteflow` client's saved quotes and daily count.
    pub store_path: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        // --- Load Upstream Settings ---
        let upstream_webhook_url = std::env::var("UPSTREAM_WEBHOOK_URL")
            .unwrap_or_else(|_| DEFAULT_UPSTREAM_WEBHOOK_URL.to_string());
        if upstream_webhook_url.trim().is_empty() {
            return Err(ConfigError::MissingVar("UPSTREAM_WEBHOOK_URL".to_string()));
        }

        let payload_shape = std::env::var("UPSTREAM_PAYLOAD_SHAPE")
            .unwrap_or_else(|_| "delimited".to_string())
            .parse::<PayloadShape>()
            .map_err(|e| {
                ConfigError::InvalidValue("UPSTREAM_PAYLOAD_SHAPE".to_string(), e.to_string())
            })?;

        // --- Load Client Settings ---
        let api_url = std::env::var("QUOTEFLOW_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let store_path = std::env::var("QUOTEFLOW_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.quoteflow/storage.json"));

        Ok(Self {
            bind_address,
            log_level,
            upstream_webhook_url,
            payload_shape,
            cors_origin,
            api_url,
            store_path,
        })
    }
}
