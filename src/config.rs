use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub meter: MeterConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeterConfig {
    /// Seed price for the settings row and fallback when the store has
    /// never been reachable.
    pub default_price_per_unit: f64,
    /// Upper bound on a single settings-store round trip.
    pub settings_store_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| config::ConfigError::Message("DATABASE_URL must be set".into()))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("SERVER_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);

        let default_price_per_unit = env::var("DEFAULT_PRICE_PER_UNIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5.0);

        let settings_store_timeout_ms = env::var("SETTINGS_STORE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2000);

        Ok(Config {
            database: DatabaseConfig {
                url: database_url,
                max_connections: Some(max_connections),
            },
            server: ServerConfig { host, port },
            meter: MeterConfig {
                default_price_per_unit,
                settings_store_timeout_ms,
            },
        })
    }
}
