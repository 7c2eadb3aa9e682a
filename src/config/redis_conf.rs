use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Redis settings for the revoked-session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: u8,
    pub connection_timeout_secs: u64,
    pub use_tls: bool,
    /// Prepended to every revoked token id.
    pub key_prefix: String,
}

impl RedisConfig {
    /// Load Redis configuration from environment variables
    ///
    /// Expected environment variables:
    /// - REDIS_HOST: Redis server host (required)
    /// - REDIS_PORT: Redis server port (defaults to 6379)
    /// - REDIS_USERNAME / REDIS_PASSWORD: optional credentials
    /// - REDIS_DATABASE: Database number (defaults to 0)
    /// - REDIS_CONNECTION_TIMEOUT: Connection timeout in seconds (defaults to 5)
    /// - REDIS_USE_TLS: Whether to use TLS/SSL (defaults to false)
    /// - REDIS_KEY_PREFIX: key namespace (defaults to "admin:revoked:")
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading Redis configuration from environment variables");

        let host = env::var("REDIS_HOST").map_err(|_| {
            error!("REDIS_HOST environment variable not found");
            ConfigError::EnvVarNotFound("REDIS_HOST".to_string())
        })?;
        debug!("Redis host: {}", host);

        let port = env::var("REDIS_PORT")
            .unwrap_or_else(|_| {
                warn!("REDIS_PORT not set, using default: 6379");
                "6379".to_string()
            })
            .parse()
            .map_err(|e| {
                error!("Invalid REDIS_PORT value: {}", e);
                ConfigError::InvalidValue(format!("Invalid port: {}", e))
            })?;

        let username = env::var("REDIS_USERNAME").ok();
        let password = env::var("REDIS_PASSWORD").ok();
        if password.is_some() {
            debug!("Redis password provided");
        }

        let database = env::var("REDIS_DATABASE")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .map_err(|e| {
                error!("Invalid REDIS_DATABASE value: {}", e);
                ConfigError::InvalidValue(format!("Invalid database: {}", e))
            })?;

        let connection_timeout_secs = env::var("REDIS_CONNECTION_TIMEOUT")
            .unwrap_or_else(|_| {
                warn!("REDIS_CONNECTION_TIMEOUT not set, using default: 5");
                "5".to_string()
            })
            .parse()
            .map_err(|e| {
                error!("Invalid REDIS_CONNECTION_TIMEOUT value: {}", e);
                ConfigError::InvalidValue(format!("Invalid connection timeout: {}", e))
            })?;

        let use_tls = env::var("REDIS_USE_TLS")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or_else(|_| {
                warn!("Invalid REDIS_USE_TLS value, defaulting to false");
                false
            });

        let key_prefix = env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "admin:revoked:".to_string());
        debug!("Redis key prefix: {}", key_prefix);

        let config = Self {
            host,
            port,
            username,
            password,
            database,
            connection_timeout_secs,
            use_tls,
            key_prefix,
        };

        config.validate()?;
        info!("Redis configuration loaded successfully");
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            error!("Redis host is empty");
            return Err(ConfigError::ValidationError("Host cannot be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::ValidationError("Port must be greater than 0".to_string()));
        }
        if self.database > 15 {
            warn!("Redis database number is high: {} (Redis default max is 15)", self.database);
        }
        if self.connection_timeout_secs == 0 {
            return Err(ConfigError::ValidationError("Connection timeout must be greater than 0".to_string()));
        }
        if self.key_prefix.is_empty() {
            return Err(ConfigError::ValidationError("Key prefix cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Get the Redis connection URL
    pub fn get_connection_url(&self) -> String {
        let protocol = if self.use_tls { "rediss" } else { "redis" };

        let auth_part = match (&self.username, &self.password) {
            (Some(username), Some(password)) => format!("{}:{}@", username, password),
            (None, Some(password)) => format!(":{}@", password),
            _ => String::new(),
        };

        format!("{}://{}{}:{}/{}", protocol, auth_part, self.host, self.port, self.database)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            username: None,
            password: None,
            database: 0,
            connection_timeout_secs: 5,
            use_tls: false,
            key_prefix: "admin:revoked:".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_url_without_auth() {
        let config = RedisConfig::default();
        assert_eq!(config.get_connection_url(), "redis://localhost:6379/0");
    }

    #[test]
    fn test_connection_url_with_password_and_tls() {
        let mut config = RedisConfig::default();
        config.password = Some("secret".to_string());
        config.use_tls = true;
        assert_eq!(config.get_connection_url(), "rediss://:secret@localhost:6379/0");
    }

    #[test]
    fn test_validate_empty_prefix() {
        let mut config = RedisConfig::default();
        config.key_prefix.clear();
        assert!(config.validate().is_err());
    }
}
