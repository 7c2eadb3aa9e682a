use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// MongoDB configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// MongoDB connection URI
    pub uri: String,
    /// Database name
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Collection holding storefront quotes
    pub quote_collection: String,
    /// Connection pool size
    pub pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,
}

impl MongoConfig {
    /// Load MongoDB configuration from environment variables
    ///
    /// Expected environment variables:
    /// - MONGO_URI: MongoDB connection URI (required)
    /// - MONGO_DATABASE: Database name (required)
    /// - MONGO_USERNAME / MONGO_PASSWORD: credentials (optional, both or neither)
    /// - MONGO_QUOTE_COLLECTION: Collection name for quotes (defaults to "quotes")
    /// - MONGO_POOL_SIZE: Connection pool size (defaults to 10)
    /// - MONGO_CONNECTION_TIMEOUT: Connection timeout in seconds (defaults to 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MongoDB configuration from environment variables");

        let uri = env::var("MONGO_URI").map_err(|_| {
            error!("MONGO_URI environment variable not found");
            ConfigError::EnvVarNotFound("MONGO_URI".to_string())
        })?;

        let database = env::var("MONGO_DATABASE").map_err(|_| {
            error!("MONGO_DATABASE environment variable not found");
            ConfigError::EnvVarNotFound("MONGO_DATABASE".to_string())
        })?;
        debug!("MongoDB database: {}", database);

        let username = env::var("MONGO_USERNAME").ok();
        let password = env::var("MONGO_PASSWORD").ok();
        if username.is_some() {
            debug!("MongoDB credentials provided");
        }

        let quote_collection = env::var("MONGO_QUOTE_COLLECTION").unwrap_or_else(|_| {
            debug!("MONGO_QUOTE_COLLECTION not set, using default: quotes");
            "quotes".to_string()
        });

        let pool_size = env::var("MONGO_POOL_SIZE")
            .unwrap_or_else(|_| {
                warn!("MONGO_POOL_SIZE not set, using default: 10");
                "10".to_string()
            })
            .parse::<u32>()
            .map_err(|_| {
                error!("Invalid MONGO_POOL_SIZE value");
                ConfigError::InvalidValue("Invalid MONGO_POOL_SIZE value".to_string())
            })?;

        let connection_timeout_secs = env::var("MONGO_CONNECTION_TIMEOUT")
            .unwrap_or_else(|_| {
                warn!("MONGO_CONNECTION_TIMEOUT not set, using default: 5 seconds");
                "5".to_string()
            })
            .parse::<u64>()
            .map_err(|_| {
                error!("Invalid MONGO_CONNECTION_TIMEOUT value");
                ConfigError::InvalidValue("Invalid MONGO_CONNECTION_TIMEOUT value".to_string())
            })?;

        let config = MongoConfig {
            uri,
            database,
            username,
            password,
            quote_collection,
            pool_size,
            connection_timeout_secs,
        };

        config.validate()?;
        info!("MongoDB configuration loaded successfully");
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uri.is_empty() {
            error!("MongoDB URI is empty");
            return Err(ConfigError::ValidationError("MongoDB URI cannot be empty".to_string()));
        }
        if self.database.is_empty() {
            error!("MongoDB database is empty");
            return Err(ConfigError::ValidationError("MongoDB database cannot be empty".to_string()));
        }
        if self.quote_collection.is_empty() {
            return Err(ConfigError::ValidationError("Quote collection cannot be empty".to_string()));
        }
        if self.pool_size == 0 {
            return Err(ConfigError::ValidationError("MongoDB pool size must be greater than 0".to_string()));
        }
        if self.connection_timeout_secs == 0 {
            return Err(ConfigError::ValidationError("MongoDB connection timeout must be greater than 0".to_string()));
        }
        match (&self.username, &self.password) {
            (Some(_), None) | (None, Some(_)) => {
                error!("MongoDB username and password must be set together");
                Err(ConfigError::ValidationError(
                    "MONGO_USERNAME and MONGO_PASSWORD must be set together".to_string(),
                ))
            }
            (Some(user), Some(pass)) if user.is_empty() || pass.is_empty() => Err(
                ConfigError::ValidationError("MongoDB credentials cannot be empty if set".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "storefront".to_string(),
            username: None,
            password: None,
            quote_collection: "quotes".to_string(),
            pool_size: 10,
            connection_timeout_secs: 5,
        }
    }
}
