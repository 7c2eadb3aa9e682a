use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::dto::catalog_dto::{CategoryRequest, ImageUpload, SubcategoryRequest};
use crate::model::catalog::{category_slug, subcategory_slug, Category, Subcategory};
use crate::repository::catalog_repo::CatalogRepository;
use crate::util::error::ServiceError;
use crate::util::storage::ObjectStorage;

pub const CATEGORY_HAS_CHILDREN: &str = "This category has subcategories. Please delete them first.";

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError>;
    async fn create_category(&self, request: CategoryRequest) -> Result<Category, ServiceError>;
    async fn update_category(&self, id: &str, request: CategoryRequest) -> Result<Category, ServiceError>;
    async fn delete_category(&self, id: &str) -> Result<(), ServiceError>;

    async fn list_subcategories(&self, category_id: Option<&str>) -> Result<Vec<Subcategory>, ServiceError>;
    async fn create_subcategory(&self, request: SubcategoryRequest) -> Result<Subcategory, ServiceError>;
    async fn update_subcategory(&self, id: &str, request: SubcategoryRequest) -> Result<Subcategory, ServiceError>;
    async fn delete_subcategory(&self, id: &str) -> Result<(), ServiceError>;

    /// Stores the image and returns its public URL.
    async fn upload_image(&self, upload: ImageUpload) -> Result<String, ServiceError>;
}

pub struct CatalogServiceImpl {
    pub catalog_repo: Arc<dyn CatalogRepository>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl CatalogServiceImpl {
    pub fn new(catalog_repo: Arc<dyn CatalogRepository>, storage: Arc<dyn ObjectStorage>) -> Self {
        CatalogServiceImpl { catalog_repo, storage }
    }

    async fn require_category(&self, id: &str) -> Result<Category, ServiceError> {
        self.catalog_repo
            .get_category(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category not found for ID: {}", id)))
    }
}

fn slug_or(explicit: Option<String>, derived: String) -> Result<String, ServiceError> {
    let slug = explicit.map(|s| s.trim().to_string()).unwrap_or(derived);
    if slug.is_empty() {
        return Err(ServiceError::InvalidInput("Slug must not be empty".to_string()));
    }
    Ok(slug)
}

/// Lowercased file name with every char outside `[a-z0-9.]` replaced by `-`.
pub fn safe_file_name(file_name: &str) -> String {
    file_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' { c } else { '-' })
        .collect()
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        Ok(self.catalog_repo.list_categories().await?)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create_category(&self, request: CategoryRequest) -> Result<Category, ServiceError> {
        let slug = slug_or(request.slug, category_slug(&request.name))?;
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            slug,
            image: request.image,
            created_at: Utc::now(),
        };
        let res = self.catalog_repo.insert_category(category).await;
        if let Err(e) = &res {
            error!("Failed to create category: {e}");
        }
        Ok(res?)
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update_category(&self, id: &str, request: CategoryRequest) -> Result<Category, ServiceError> {
        let existing = self.require_category(id).await?;
        let slug = slug_or(request.slug, category_slug(&request.name))?;
        let category = Category {
            name: request.name.trim().to_string(),
            slug,
            image: request.image.or(existing.image),
            ..existing
        };
        Ok(self.catalog_repo.update_category(category).await?)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_category(&self, id: &str) -> Result<(), ServiceError> {
        let children = self.catalog_repo.count_subcategories(Some(id)).await?;
        if children > 0 {
            warn!(children, "Refusing to delete category with subcategories");
            return Err(ServiceError::Conflict(CATEGORY_HAS_CHILDREN.to_string()));
        }
        self.catalog_repo.delete_category(id).await?;
        info!("Category deleted");
        Ok(())
    }

    async fn list_subcategories(&self, category_id: Option<&str>) -> Result<Vec<Subcategory>, ServiceError> {
        Ok(self.catalog_repo.list_subcategories(category_id).await?)
    }

    #[instrument(skip(self, request), fields(name = %request.name, category_id = %request.category_id))]
    async fn create_subcategory(&self, request: SubcategoryRequest) -> Result<Subcategory, ServiceError> {
        self.require_category(&request.category_id).await?;
        let slug = slug_or(request.slug, subcategory_slug(&request.name))?;
        let subcategory = Subcategory {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            slug,
            category_id: request.category_id,
            image: request.image,
            created_at: Utc::now(),
        };
        Ok(self.catalog_repo.insert_subcategory(subcategory).await?)
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update_subcategory(&self, id: &str, request: SubcategoryRequest) -> Result<Subcategory, ServiceError> {
        let existing = self
            .catalog_repo
            .get_subcategory(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Subcategory not found for ID: {}", id)))?;
        if existing.category_id != request.category_id {
            self.require_category(&request.category_id).await?;
        }
        let slug = slug_or(request.slug, subcategory_slug(&request.name))?;
        let subcategory = Subcategory {
            name: request.name.trim().to_string(),
            slug,
            category_id: request.category_id,
            image: request.image.or(existing.image),
            ..existing
        };
        Ok(self.catalog_repo.update_subcategory(subcategory).await?)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_subcategory(&self, id: &str) -> Result<(), ServiceError> {
        self.catalog_repo.delete_subcategory(id).await?;
        info!("Subcategory deleted");
        Ok(())
    }

    #[instrument(skip(self, upload), fields(folder = upload.folder.as_str(), file = %upload.file_name, size = upload.data.len()))]
    async fn upload_image(&self, upload: ImageUpload) -> Result<String, ServiceError> {
        if !upload.content_type.starts_with("image/") {
            return Err(ServiceError::InvalidInput(format!(
                "Only images can be uploaded, got {}",
                upload.content_type
            )));
        }
        if upload.data.is_empty() {
            return Err(ServiceError::InvalidInput("Uploaded file is empty".to_string()));
        }
        let key = format!(
            "{}/{}-{}",
            upload.folder.as_str(),
            Utc::now().timestamp_millis(),
            safe_file_name(&upload.file_name)
        );
        self.storage
            .put_object(&key, upload.data, &upload.content_type)
            .await
            .map_err(|e| {
                error!("Image upload failed: {e}");
                ServiceError::InternalError(format!("Storage error: {e}"))
            })?;
        info!(key = %key, "Image uploaded");
        Ok(self.storage.public_url(&key))
    }
}
