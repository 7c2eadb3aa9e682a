use async_trait::async_trait;
use bson::{doc, Document};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Collection, Database, IndexModel};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::model::catalog::{Category, Subcategory};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Newest first.
    async fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    async fn get_category(&self, id: &str) -> RepositoryResult<Option<Category>>;
    async fn insert_category(&self, category: Category) -> RepositoryResult<Category>;
    async fn update_category(&self, category: Category) -> RepositoryResult<Category>;
    async fn delete_category(&self, id: &str) -> RepositoryResult<()>;
    async fn count_categories(&self) -> RepositoryResult<u64>;

    /// Newest first, optionally restricted to one category.
    async fn list_subcategories(&self, category_id: Option<&str>) -> RepositoryResult<Vec<Subcategory>>;
    async fn get_subcategory(&self, id: &str) -> RepositoryResult<Option<Subcategory>>;
    async fn insert_subcategory(&self, subcategory: Subcategory) -> RepositoryResult<Subcategory>;
    async fn update_subcategory(&self, subcategory: Subcategory) -> RepositoryResult<Subcategory>;
    async fn delete_subcategory(&self, id: &str) -> RepositoryResult<()>;
    async fn count_subcategories(&self, category_id: Option<&str>) -> RepositoryResult<u64>;
}

pub struct MongoCatalogRepository {
    categories: Collection<Category>,
    subcategories: Collection<Subcategory>,
}

fn category_filter(category_id: Option<&str>) -> Document {
    match category_id {
        Some(id) => doc! { "category_id": id },
        None => Document::new(),
    }
}

fn newest_first() -> FindOptions {
    FindOptions::builder().sort(doc! { "created_at": -1 }).build()
}

impl MongoCatalogRepository {
    pub fn new(db: &Database) -> Self {
        MongoCatalogRepository {
            categories: db.collection::<Category>("categories"),
            subcategories: db.collection::<Subcategory>("subcategories"),
        }
    }

    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        let unique = || IndexOptions::builder().unique(true).build();
        self.categories
            .create_index(IndexModel::builder().keys(doc! { "slug": 1 }).options(unique()).build(), None)
            .await?;
        self.subcategories
            .create_indexes(
                vec![
                    IndexModel::builder().keys(doc! { "slug": 1 }).options(unique()).build(),
                    IndexModel::builder().keys(doc! { "category_id": 1 }).build(),
                ],
                None,
            )
            .await?;
        info!("Catalog indexes ensured");
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for MongoCatalogRepository {
    async fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        let cursor = self.categories.find(None, newest_first()).await?;
        Ok(cursor.try_collect().await?)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_category(&self, id: &str) -> RepositoryResult<Option<Category>> {
        Ok(self.categories.find_one(doc! { "_id": id }, None).await?)
    }

    #[tracing::instrument(skip(self, category), fields(slug = %category.slug))]
    async fn insert_category(&self, category: Category) -> RepositoryResult<Category> {
        match self.categories.insert_one(&category, None).await {
            Ok(_) => {
                info!("Category created");
                Ok(category)
            }
            Err(e) => {
                error!("Failed to create category: {}", e);
                Err(e.into())
            }
        }
    }

    #[tracing::instrument(skip(self, category), fields(id = %category.id))]
    async fn update_category(&self, category: Category) -> RepositoryResult<Category> {
        let result = self
            .categories
            .replace_one(doc! { "_id": category.id.as_str() }, &category, None)
            .await?;
        if result.matched_count == 0 {
            warn!("No category found to update");
            return Err(RepositoryError::not_found(format!("Category not found for ID: {}", category.id)));
        }
        Ok(category)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete_category(&self, id: &str) -> RepositoryResult<()> {
        let result = self.categories.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("Category not found for ID: {}", id)));
        }
        info!("Category deleted");
        Ok(())
    }

    async fn count_categories(&self) -> RepositoryResult<u64> {
        Ok(self.categories.count_documents(None, None).await?)
    }

    async fn list_subcategories(&self, category_id: Option<&str>) -> RepositoryResult<Vec<Subcategory>> {
        let cursor = self.subcategories.find(category_filter(category_id), newest_first()).await?;
        Ok(cursor.try_collect().await?)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_subcategory(&self, id: &str) -> RepositoryResult<Option<Subcategory>> {
        Ok(self.subcategories.find_one(doc! { "_id": id }, None).await?)
    }

    #[tracing::instrument(skip(self, subcategory), fields(slug = %subcategory.slug))]
    async fn insert_subcategory(&self, subcategory: Subcategory) -> RepositoryResult<Subcategory> {
        match self.subcategories.insert_one(&subcategory, None).await {
            Ok(_) => {
                info!("Subcategory created");
                Ok(subcategory)
            }
            Err(e) => {
                error!("Failed to create subcategory: {}", e);
                Err(e.into())
            }
        }
    }

    #[tracing::instrument(skip(self, subcategory), fields(id = %subcategory.id))]
    async fn update_subcategory(&self, subcategory: Subcategory) -> RepositoryResult<Subcategory> {
        let result = self
            .subcategories
            .replace_one(doc! { "_id": subcategory.id.as_str() }, &subcategory, None)
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Subcategory not found for ID: {}", subcategory.id)));
        }
        Ok(subcategory)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete_subcategory(&self, id: &str) -> RepositoryResult<()> {
        let result = self.subcategories.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("Subcategory not found for ID: {}", id)));
        }
        info!("Subcategory deleted");
        Ok(())
    }

    async fn count_subcategories(&self, category_id: Option<&str>) -> RepositoryResult<u64> {
        Ok(self.subcategories.count_documents(category_filter(category_id), None).await?)
    }
}

#[derive(Default)]
pub struct InMemoryCatalogRepository {
    categories: RwLock<Vec<Category>>,
    subcategories: RwLock<Vec<Subcategory>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        let mut categories = self.categories.read().await.clone();
        categories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(categories)
    }

    async fn get_category(&self, id: &str) -> RepositoryResult<Option<Category>> {
        Ok(self.categories.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_category(&self, category: Category) -> RepositoryResult<Category> {
        let mut categories = self.categories.write().await;
        if categories.iter().any(|c| c.slug == category.slug) {
            return Err(RepositoryError::already_exists(format!("Duplicate key: slug {}", category.slug)));
        }
        categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, category: Category) -> RepositoryResult<Category> {
        let mut categories = self.categories.write().await;
        if categories.iter().any(|c| c.slug == category.slug && c.id != category.id) {
            return Err(RepositoryError::already_exists(format!("Duplicate key: slug {}", category.slug)));
        }
        let slot = categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or_else(|| RepositoryError::not_found(format!("Category not found for ID: {}", category.id)))?;
        *slot = category.clone();
        Ok(category)
    }

    async fn delete_category(&self, id: &str) -> RepositoryResult<()> {
        let mut categories = self.categories.write().await;
        let before = categories.len();
        categories.retain(|c| c.id != id);
        if categories.len() == before {
            return Err(RepositoryError::not_found(format!("Category not found for ID: {}", id)));
        }
        Ok(())
    }

    async fn count_categories(&self) -> RepositoryResult<u64> {
        Ok(self.categories.read().await.len() as u64)
    }

    async fn list_subcategories(&self, category_id: Option<&str>) -> RepositoryResult<Vec<Subcategory>> {
        let mut subcategories: Vec<Subcategory> = self
            .subcategories
            .read()
            .await
            .iter()
            .filter(|s| category_id.map_or(true, |id| s.category_id == id))
            .cloned()
            .collect();
        subcategories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(subcategories)
    }

    async fn get_subcategory(&self, id: &str) -> RepositoryResult<Option<Subcategory>> {
        Ok(self.subcategories.read().await.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_subcategory(&self, subcategory: Subcategory) -> RepositoryResult<Subcategory> {
        let mut subcategories = self.subcategories.write().await;
        if subcategories.iter().any(|s| s.slug == subcategory.slug) {
            return Err(RepositoryError::already_exists(format!("Duplicate key: slug {}", subcategory.slug)));
        }
        subcategories.push(subcategory.clone());
        Ok(subcategory)
    }

    async fn update_subcategory(&self, subcategory: Subcategory) -> RepositoryResult<Subcategory> {
        let mut subcategories = self.subcategories.write().await;
        if subcategories.iter().any(|s| s.slug == subcategory.slug && s.id != subcategory.id) {
            return Err(RepositoryError::already_exists(format!("Duplicate key: slug {}", subcategory.slug)));
        }
        let slot = subcategories
            .iter_mut()
            .find(|s| s.id == subcategory.id)
            .ok_or_else(|| RepositoryError::not_found(format!("Subcategory not found for ID: {}", subcategory.id)))?;
        *slot = subcategory.clone();
        Ok(subcategory)
    }

    async fn delete_subcategory(&self, id: &str) -> RepositoryResult<()> {
        let mut subcategories = self.subcategories.write().await;
        let before = subcategories.len();
        subcategories.retain(|s| s.id != id);
        if subcategories.len() == before {
            return Err(RepositoryError::not_found(format!("Subcategory not found for ID: {}", id)));
        }
        Ok(())
    }

    async fn count_subcategories(&self, category_id: Option<&str>) -> RepositoryResult<u64> {
        Ok(self
            .subcategories
            .read()
            .await
            .iter()
            .filter(|s| category_id.map_or(true, |id| s.category_id == id))
            .count() as u64)
    }
}
