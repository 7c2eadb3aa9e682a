use std::env;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::config::ConfigError;

/// Which family of collaborators the application is wired against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// MongoDB, MinIO and Redis.
    Mongo,
    /// Process-local stores; nothing external is contacted.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::InvalidValue(format!("Unknown APP_BACKEND: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Where the session gate sends unauthenticated requests.
    pub login_path: String,
    pub backend: StorageBackend,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading application configuration from environment variables");

        let host = env::var("APP_HOST").unwrap_or_else(|_| {
            warn!("APP_HOST not set, using default: 127.0.0.1");
            "127.0.0.1".to_string()
        });

        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| {
                warn!("APP_PORT not set, using default: 8080");
                "8080".to_string()
            })
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidValue(format!("APP_PORT: {}", e)))?;

        let login_path = env::var("APP_LOGIN_PATH").unwrap_or_else(|_| "/login".to_string());
        debug!("Login path: {}", login_path);

        let backend = match env::var("APP_BACKEND") {
            Ok(raw) => raw.parse::<StorageBackend>()?,
            Err(_) => {
                warn!("APP_BACKEND not set, using default: mongo");
                StorageBackend::Mongo
            }
        };
        debug!("Storage backend: {:?}", backend);

        let config = AppConfig { host, port, login_path, backend };
        config.validate()?;
        info!("Application configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::ValidationError("APP_HOST cannot be empty".to_string()));
        }
        if !self.login_path.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "APP_LOGIN_PATH must be an absolute path".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            login_path: "/login".to_string(),
            backend: StorageBackend::Memory,
        }
    }
}
