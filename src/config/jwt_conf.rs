use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// JWT configuration structure
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub jwt_secret: String,
    /// Access token lifetime in minutes
    pub access_token_expiration: i64,
    /// Refresh token lifetime in minutes
    pub refresh_token_expiration: i64,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET: Secret key for signing JWT tokens (required, at least 32 chars)
    /// - JWT_ACCESS_TOKEN_EXPIRY: Access token expiration in minutes (defaults to 15)
    /// - JWT_REFRESH_TOKEN_EXPIRY: Refresh token expiration in minutes (defaults to 10080)
    /// - JWT_ISSUER / JWT_AUDIENCE: optional registered claims
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| {
            error!("JWT_SECRET environment variable not found");
            ConfigError::EnvVarNotFound("JWT_SECRET".to_string())
        })?;
        debug!("JWT secret loaded (length: {} chars)", jwt_secret.len());

        let access_token_expiration = env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| {
                warn!("JWT_ACCESS_TOKEN_EXPIRY not set, using default: 15 minutes");
                "15".to_string()
            })
            .parse::<i64>()
            .map_err(|e| {
                error!("Invalid JWT_ACCESS_TOKEN_EXPIRY value: {}", e);
                ConfigError::InvalidValue(format!("JWT_ACCESS_TOKEN_EXPIRY: {}", e))
            })?;

        let refresh_token_expiration = env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| {
                warn!("JWT_REFRESH_TOKEN_EXPIRY not set, using default: 10080 minutes (1 week)");
                "10080".to_string()
            })
            .parse::<i64>()
            .map_err(|e| {
                error!("Invalid JWT_REFRESH_TOKEN_EXPIRY value: {}", e);
                ConfigError::InvalidValue(format!("JWT_REFRESH_TOKEN_EXPIRY: {}", e))
            })?;

        let config = JwtConfig {
            jwt_secret,
            access_token_expiration,
            refresh_token_expiration,
            jwt_issuer: env::var("JWT_ISSUER").ok(),
            jwt_audience: env::var("JWT_AUDIENCE").ok(),
        };

        config.validate()?;
        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    /// Validate the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        debug!("Validating JWT configuration");

        if self.jwt_secret.len() < 32 {
            error!("JWT secret is too short (minimum 32 characters required)");
            return Err(ConfigError::ValidationError(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }
        if self.access_token_expiration <= 0 {
            return Err(ConfigError::ValidationError(
                "Access token expiration must be greater than 0".to_string(),
            ));
        }
        if self.refresh_token_expiration <= 0 {
            return Err(ConfigError::ValidationError(
                "Refresh token expiration must be greater than 0".to_string(),
            ));
        }
        if self.access_token_expiration >= self.refresh_token_expiration {
            warn!("Access token expiration is greater than or equal to refresh token expiration");
        }
        Ok(())
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "development_secret_key_that_is_long_enough_for_hs256".to_string(),
            access_token_expiration: 15,
            refresh_token_expiration: 10080,
            jwt_issuer: Some("admin-panel-backend".to_string()),
            jwt_audience: Some("admin-panel".to_string()),
        }
    }
}
