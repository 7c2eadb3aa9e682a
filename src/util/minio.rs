use async_trait::async_trait;
use minio::s3::args::{BucketExistsArgs, MakeBucketArgs, PutObjectArgs};
use minio::s3::client::{Client, ClientBuilder};
use minio::s3::creds::StaticProvider;
use minio::s3::http::BaseUrl;
use std::io::Cursor;
use tracing::{debug, error, info, instrument, warn};

use crate::config::MinioConfig;
use crate::util::storage::{ObjectStorage, StorageError};

#[derive(Debug, Clone)]
pub struct MinioService {
    client: Client,
    pub config: MinioConfig,
}

impl MinioService {
    #[instrument(skip(config), fields(endpoint = %config.endpoint, bucket = %config.bucket_name))]
    pub async fn new(config: MinioConfig) -> Result<Self, StorageError> {
        info!("Initializing MinIO service");

        config.validate().map_err(|e| {
            error!("MinIO configuration validation failed: {}", e);
            StorageError::ConfigError(e.to_string())
        })?;

        let base_url = config.get_endpoint_url().parse::<BaseUrl>().map_err(|e| {
            error!("Failed to parse MinIO endpoint URL: {}", e);
            StorageError::ConnectionError(format!("Invalid endpoint URL: {}", e))
        })?;

        let static_provider = StaticProvider::new(&config.access_key, &config.secret_key, None);

        let client = ClientBuilder::new(base_url)
            .provider(Some(Box::new(static_provider)))
            .build()
            .map_err(|e| {
                error!("Failed to create MinIO client: {}", e);
                StorageError::ConnectionError(format!("Client creation failed: {}", e))
            })?;

        let service = Self { client, config };
        service.ensure_bucket_exists().await?;

        info!("MinIO service initialized successfully");
        Ok(service)
    }

    #[instrument(skip(self))]
    async fn ensure_bucket_exists(&self) -> Result<(), StorageError> {
        let bucket_exists_args = BucketExistsArgs::new(&self.config.bucket_name)
            .map_err(|e| StorageError::InvalidArguments(e.to_string()))?;

        let exists = self.client.bucket_exists(&bucket_exists_args).await.map_err(|e| {
            error!("Failed to check if bucket exists: {}", e);
            StorageError::OperationError(format!("Bucket exists check failed: {}", e))
        })?;

        if exists {
            debug!("Bucket '{}' already exists", self.config.bucket_name);
            return Ok(());
        }

        warn!("Bucket '{}' does not exist, creating it", self.config.bucket_name);
        let make_bucket_args = MakeBucketArgs::new(&self.config.bucket_name)
            .map_err(|e| StorageError::InvalidArguments(e.to_string()))?;

        self.client.make_bucket(&make_bucket_args).await.map_err(|e| {
            error!("Failed to create bucket '{}': {}", self.config.bucket_name, e);
            StorageError::OperationError(format!("Bucket creation failed: {}", e))
        })?;

        info!("Created bucket '{}'", self.config.bucket_name);
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for MinioService {
    #[instrument(skip(self, data), fields(object_name = %key, size = data.len()))]
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        let bucket_name = self.config.bucket_name.clone();
        let object_name = key.to_string();
        let client = self.client.clone();
        let content_type = content_type.to_string();

        // PutObjectArgs borrows a reader that is not Send, so the upload runs on a blocking thread
        tokio::task::spawn_blocking(move || {
            let mut reader = Cursor::new(data);
            let data_len = reader.get_ref().len();

            let mut args = PutObjectArgs::new(&bucket_name, &object_name, &mut reader, Some(data_len), None)
                .map_err(|e| StorageError::InvalidArguments(e.to_string()))?;
            args.content_type = &content_type;

            futures::executor::block_on(client.put_object(&mut args))
                .map_err(|e| StorageError::OperationError(format!("Upload failed: {}", e)))?;

            info!("Uploaded object '{}'", &object_name);
            Ok::<(), StorageError>(())
        })
        .await
        .map_err(|e| {
            error!("Failed to join blocking task for put_object: {}", e);
            StorageError::OperationError(format!("Join error: {}", e))
        })??;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.config.public_url(key)
    }
}
