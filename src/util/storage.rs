use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Connection error: {0}")]
    ConnectionError(String),
    #[error("Operation error: {0}")]
    OperationError(String),
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Bucket-style blob storage for uploaded images.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError>;
    /// Link under which `key` is served.
    fn public_url(&self, key: &str) -> String;
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

pub struct InMemoryObjectStorage {
    base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl InMemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        InMemoryObjectStorage {
            base_url: base_url.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for InMemoryObjectStorage {
    fn default() -> Self {
        Self::new("memory://objects")
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidArguments("Object key cannot be empty".to_string()));
        }
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject { data, content_type: content_type.to_string() },
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}
