//! API configuration module.
//!
//! Loaded with the `config` crate: an optional `haven.toml` next to the
//! binary, then environment variables prefixed `HAVEN_`. Nested keys use a
//! double underscore, so `HAVEN_PAYMOB__API_KEY` sets `paymob.api_key`.

use ::config::{Config, Environment, File};
use haven_booking::GatewayConfig;
use serde::Deserialize;

/// Which payment gateway implementation serves sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    /// Paymob Accept over HTTPS.
    Paymob,
    /// Local in-process gateway, for development without credentials.
    Memory,
}

/// Haven API configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Bind address
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size for the SQLite connection pool
    pub db_max_connections: u32,

    /// Secret for verifying bearer tokens (HS256)
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    pub gateway: GatewayKind,

    pub paymob: GatewayConfig,

    /// Process callbacks even when the signature does not verify.
    /// Debugging only; mismatches are still logged.
    pub webhook_signature_soft_fail: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_path: "haven.db".to_string(),
            db_max_connections: 5,
            jwt_secret: "haven-dev-secret-change-in-production".to_string(),
            jwt_access_lifetime_secs: 3600,
            gateway: GatewayKind::Paymob,
            paymob: GatewayConfig::default(),
            webhook_signature_soft_fail: false,
        }
    }
}

impl ApiConfig {
    /// Load configuration from `haven.toml` (optional) and `HAVEN_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("haven").required(false))
            .add_source(
                Environment::with_prefix("HAVEN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ApiConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings that have no usable default.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt_secret".to_string()));
        }
        if self.jwt_access_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("jwt_access_lifetime_secs".to_string()));
        }

        if self.gateway == GatewayKind::Paymob {
            let gateway = &self.paymob;
            if gateway.api_key.trim().is_empty() {
                return Err(ConfigError::MissingRequired("paymob.api_key".to_string()));
            }
            if gateway.integration_id <= 0 {
                return Err(ConfigError::MissingRequired("paymob.integration_id".to_string()));
            }
            if gateway.iframe_id <= 0 {
                return Err(ConfigError::MissingRequired("paymob.iframe_id".to_string()));
            }
            if gateway.hmac_secret.trim().is_empty() {
                return Err(ConfigError::MissingRequired("paymob.hmac_secret".to_string()));
            }
        }

        Ok(())
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
