//! Configuration management for the jewelry admin backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with JADM_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Logistics carrier configuration
    pub carrier: CarrierConfig,

    /// Order lifecycle configuration
    pub orders: OrderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key used to verify operator tokens
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CarrierConfig {
    /// Display name recorded on tracking events
    pub name: String,

    /// Carrier API base URL
    pub base_url: String,

    /// API token sent in every request body
    pub api_token: String,

    /// Origin store code registered with the carrier
    pub origin_store_code: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Weight in grams assumed for items without a declared gross weight
    pub default_item_weight: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OrderConfig {
    /// Reject status changes outside the forward-only transition table
    pub enforce_transitions: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("JADM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("carrier.name", "sequel")?
            .set_default("carrier.timeout_secs", 30)?
            .set_default("carrier.default_item_weight", "10")?
            .set_default("orders.enforce_transitions", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (JADM_ prefix)
            .add_source(
                Environment::with_prefix("JADM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject blank required settings so startup fails instead of degrading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("database.url", &self.database.url),
            ("jwt.secret", &self.jwt.secret),
            ("carrier.base_url", &self.carrier.base_url),
            ("carrier.api_token", &self.carrier.api_token),
            ("carrier.origin_store_code", &self.carrier.origin_store_code),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Message(format!("{} must not be empty", key)));
            }
        }

        if self.carrier.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "carrier.timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.carrier.default_item_weight <= Decimal::ZERO {
            return Err(ConfigError::Message(
                "carrier.default_item_weight must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_carrier_config() -> CarrierConfig {
    CarrierConfig {
        name: "sequel".to_string(),
        base_url: "http://carrier.test".to_string(),
        api_token: "test-token".to_string(),
        origin_store_code: "MUM01".to_string(),
        timeout_secs: 5,
        default_item_weight: Decimal::from(10),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgres://localhost/jewelry".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            jwt: JwtConfig {
                secret: "secret".to_string(),
            },
            carrier: test_carrier_config(),
            orders: OrderConfig {
                enforce_transitions: false,
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_blank_carrier_token_fails_fast() {
        let mut config = valid_config();
        config.carrier.api_token = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("carrier.api_token"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = valid_config();
        config.carrier.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
