use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

use crate::config::RedisConfig;

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Connection error: {0}")]
    ConnectionError(String),
    #[error("Operation error: {0}")]
    OperationError(String),
}

/// Revoked token ids, each remembered until the token would have expired anyway.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn revoke(&self, token_id: &str, ttl_secs: u64) -> Result<(), SessionStoreError>;
    async fn is_revoked(&self, token_id: &str) -> Result<bool, SessionStoreError>;
}

#[derive(Clone)]
pub struct RedisSessionStore {
    connection_manager: ConnectionManager,
    key_prefix: String,
}

impl RedisSessionStore {
    #[instrument(skip(config), fields(host = %config.host, port = config.port, db = config.database))]
    pub async fn new(config: RedisConfig) -> Result<Self, SessionStoreError> {
        info!("Initializing Redis session store");

        config.validate().map_err(|e| {
            error!("Redis configuration validation failed: {}", e);
            SessionStoreError::ConfigError(e.to_string())
        })?;

        let client = Client::open(config.get_connection_url()).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            SessionStoreError::ConnectionError(format!("Client creation failed: {}", e))
        })?;

        let connection_manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to create Redis connection manager: {}", e);
            SessionStoreError::ConnectionError(format!("Connection manager creation failed: {}", e))
        })?;

        let store = Self { connection_manager, key_prefix: config.key_prefix };
        store.ping().await?;
        info!("Redis session store initialized");
        Ok(store)
    }

    async fn ping(&self) -> Result<(), SessionStoreError> {
        let mut conn = self.connection_manager.clone();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await.map_err(|e| {
            error!("Redis ping failed: {}", e);
            SessionStoreError::ConnectionError(format!("Ping failed: {}", e))
        })?;
        if reply != "PONG" {
            return Err(SessionStoreError::ConnectionError(format!("Unexpected ping response: {}", reply)));
        }
        Ok(())
    }

    fn key(&self, token_id: &str) -> String {
        format!("{}{}", self.key_prefix, token_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    #[instrument(skip(self))]
    async fn revoke(&self, token_id: &str, ttl_secs: u64) -> Result<(), SessionStoreError> {
        let mut conn = self.connection_manager.clone();
        let _: () = conn.set_ex(self.key(token_id), 1_u8, ttl_secs.max(1)).await.map_err(|e| {
            error!("Failed to revoke token: {}", e);
            SessionStoreError::OperationError(format!("SETEX failed: {}", e))
        })?;
        debug!("Token revoked for {} seconds", ttl_secs);
        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool, SessionStoreError> {
        let mut conn = self.connection_manager.clone();
        conn.exists(self.key(token_id)).await.map_err(|e| {
            error!("Failed to look up revoked token: {}", e);
            SessionStoreError::OperationError(format!("EXISTS failed: {}", e))
        })
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    revoked: Mutex<HashMap<String, Instant>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn revoke(&self, token_id: &str, ttl_secs: u64) -> Result<(), SessionStoreError> {
        let mut revoked = self.revoked.lock().await;
        let now = Instant::now();
        revoked.retain(|_, expires| *expires > now);
        revoked.insert(token_id.to_string(), now + Duration::from_secs(ttl_secs.max(1)));
        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool, SessionStoreError> {
        let revoked = self.revoked.lock().await;
        Ok(revoked.get(token_id).is_some_and(|expires| *expires > Instant::now()))
    }
}
