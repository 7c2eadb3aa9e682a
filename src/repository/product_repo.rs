use async_trait::async_trait;
use bson::{doc, Document};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Collection, Database, IndexModel};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::model::product::{Product, ProductImage, ProductVariant};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Products, their variants and the variants' images.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Newest first, optionally restricted to a set of subcategories.
    async fn list_products(&self, subcategory_ids: Option<&[String]>) -> RepositoryResult<Vec<Product>>;
    async fn get_product(&self, id: &str) -> RepositoryResult<Option<Product>>;
    async fn insert_product(&self, product: Product) -> RepositoryResult<Product>;
    async fn update_product(&self, product: Product) -> RepositoryResult<Product>;
    async fn delete_product(&self, id: &str) -> RepositoryResult<()>;

    /// Oldest first, for every product in `product_ids`.
    async fn list_variants(&self, product_ids: &[String]) -> RepositoryResult<Vec<ProductVariant>>;
    async fn get_variant(&self, id: &str) -> RepositoryResult<Option<ProductVariant>>;
    async fn insert_variant(&self, variant: ProductVariant) -> RepositoryResult<ProductVariant>;
    async fn update_variant(&self, variant: ProductVariant) -> RepositoryResult<ProductVariant>;
    /// Removes the variants and every image attached to them. Returns how many variants went.
    async fn delete_variants(&self, ids: &[String]) -> RepositoryResult<u64>;

    /// Oldest first, for every variant in `variant_ids`.
    async fn list_images(&self, variant_ids: &[String]) -> RepositoryResult<Vec<ProductImage>>;
    /// Makes `images` the complete image set of the variant.
    async fn replace_images(&self, variant_id: &str, images: Vec<ProductImage>) -> RepositoryResult<Vec<ProductImage>>;
}

pub struct MongoProductRepository {
    products: Collection<Product>,
    variants: Collection<ProductVariant>,
    images: Collection<ProductImage>,
}

fn oldest_first() -> FindOptions {
    FindOptions::builder().sort(doc! { "created_at": 1 }).build()
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        MongoProductRepository {
            products: db.collection::<Product>("products"),
            variants: db.collection::<ProductVariant>("product_variants"),
            images: db.collection::<ProductImage>("product_images"),
        }
    }

    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        self.products
            .create_indexes(
                vec![
                    IndexModel::builder()
                        .keys(doc! { "slug": 1 })
                        .options(IndexOptions::builder().unique(true).build())
                        .build(),
                    IndexModel::builder().keys(doc! { "subcategory_id": 1 }).build(),
                ],
                None,
            )
            .await?;
        self.variants
            .create_index(IndexModel::builder().keys(doc! { "product_id": 1 }).build(), None)
            .await?;
        self.images
            .create_index(IndexModel::builder().keys(doc! { "variant_id": 1 }).build(), None)
            .await?;
        info!("Product indexes ensured");
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[tracing::instrument(skip(self, subcategory_ids))]
    async fn list_products(&self, subcategory_ids: Option<&[String]>) -> RepositoryResult<Vec<Product>> {
        let filter = match subcategory_ids {
            Some(ids) => doc! { "subcategory_id": { "$in": ids.to_vec() } },
            None => Document::new(),
        };
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let cursor = self.products.find(filter, options).await?;
        Ok(cursor.try_collect().await?)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_product(&self, id: &str) -> RepositoryResult<Option<Product>> {
        Ok(self.products.find_one(doc! { "_id": id }, None).await?)
    }

    #[tracing::instrument(skip(self, product), fields(slug = %product.slug))]
    async fn insert_product(&self, product: Product) -> RepositoryResult<Product> {
        match self.products.insert_one(&product, None).await {
            Ok(_) => {
                info!("Product created");
                Ok(product)
            }
            Err(e) => {
                error!("Failed to create product: {}", e);
                Err(e.into())
            }
        }
    }

    #[tracing::instrument(skip(self, product), fields(id = %product.id))]
    async fn update_product(&self, product: Product) -> RepositoryResult<Product> {
        let result = self
            .products
            .replace_one(doc! { "_id": product.id.as_str() }, &product, None)
            .await?;
        if result.matched_count == 0 {
            warn!("No product found to update");
            return Err(RepositoryError::not_found(format!("Product not found for ID: {}", product.id)));
        }
        Ok(product)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete_product(&self, id: &str) -> RepositoryResult<()> {
        let result = self.products.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("Product not found for ID: {}", id)));
        }
        info!("Product deleted");
        Ok(())
    }

    async fn list_variants(&self, product_ids: &[String]) -> RepositoryResult<Vec<ProductVariant>> {
        let cursor = self
            .variants
            .find(doc! { "product_id": { "$in": product_ids.to_vec() } }, oldest_first())
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn get_variant(&self, id: &str) -> RepositoryResult<Option<ProductVariant>> {
        Ok(self.variants.find_one(doc! { "_id": id }, None).await?)
    }

    #[tracing::instrument(skip(self, variant), fields(product_id = %variant.product_id))]
    async fn insert_variant(&self, variant: ProductVariant) -> RepositoryResult<ProductVariant> {
        self.variants.insert_one(&variant, None).await?;
        Ok(variant)
    }

    #[tracing::instrument(skip(self, variant), fields(id = %variant.id))]
    async fn update_variant(&self, variant: ProductVariant) -> RepositoryResult<ProductVariant> {
        let result = self
            .variants
            .replace_one(doc! { "_id": variant.id.as_str() }, &variant, None)
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Variant not found for ID: {}", variant.id)));
        }
        Ok(variant)
    }

    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete_variants(&self, ids: &[String]) -> RepositoryResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.images.delete_many(doc! { "variant_id": { "$in": ids.to_vec() } }, None).await?;
        let result = self.variants.delete_many(doc! { "_id": { "$in": ids.to_vec() } }, None).await?;
        info!(deleted = result.deleted_count, "Variants deleted");
        Ok(result.deleted_count)
    }

    async fn list_images(&self, variant_ids: &[String]) -> RepositoryResult<Vec<ProductImage>> {
        let cursor = self
            .images
            .find(doc! { "variant_id": { "$in": variant_ids.to_vec() } }, oldest_first())
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[tracing::instrument(skip(self, images), fields(variant_id = %variant_id, count = images.len()))]
    async fn replace_images(&self, variant_id: &str, images: Vec<ProductImage>) -> RepositoryResult<Vec<ProductImage>> {
        self.images.delete_many(doc! { "variant_id": variant_id }, None).await?;
        if !images.is_empty() {
            self.images.insert_many(&images, None).await?;
        }
        Ok(images)
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
    variants: RwLock<Vec<ProductVariant>>,
    images: RwLock<Vec<ProductImage>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list_products(&self, subcategory_ids: Option<&[String]>) -> RepositoryResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .await
            .iter()
            .filter(|p| subcategory_ids.map_or(true, |ids| ids.contains(&p.subcategory_id)))
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn get_product(&self, id: &str) -> RepositoryResult<Option<Product>> {
        Ok(self.products.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_product(&self, product: Product) -> RepositoryResult<Product> {
        let mut products = self.products.write().await;
        if products.iter().any(|p| p.slug == product.slug) {
            return Err(RepositoryError::already_exists(format!("Duplicate key: slug {}", product.slug)));
        }
        products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, product: Product) -> RepositoryResult<Product> {
        let mut products = self.products.write().await;
        if products.iter().any(|p| p.slug == product.slug && p.id != product.id) {
            return Err(RepositoryError::already_exists(format!("Duplicate key: slug {}", product.slug)));
        }
        let slot = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| RepositoryError::not_found(format!("Product not found for ID: {}", product.id)))?;
        *slot = product.clone();
        Ok(product)
    }

    async fn delete_product(&self, id: &str) -> RepositoryResult<()> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(RepositoryError::not_found(format!("Product not found for ID: {}", id)));
        }
        Ok(())
    }

    async fn list_variants(&self, product_ids: &[String]) -> RepositoryResult<Vec<ProductVariant>> {
        let mut variants: Vec<ProductVariant> = self
            .variants
            .read()
            .await
            .iter()
            .filter(|v| product_ids.contains(&v.product_id))
            .cloned()
            .collect();
        variants.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(variants)
    }

    async fn get_variant(&self, id: &str) -> RepositoryResult<Option<ProductVariant>> {
        Ok(self.variants.read().await.iter().find(|v| v.id == id).cloned())
    }

    async fn insert_variant(&self, variant: ProductVariant) -> RepositoryResult<ProductVariant> {
        self.variants.write().await.push(variant.clone());
        Ok(variant)
    }

    async fn update_variant(&self, variant: ProductVariant) -> RepositoryResult<ProductVariant> {
        let mut variants = self.variants.write().await;
        let slot = variants
            .iter_mut()
            .find(|v| v.id == variant.id)
            .ok_or_else(|| RepositoryError::not_found(format!("Variant not found for ID: {}", variant.id)))?;
        *slot = variant.clone();
        Ok(variant)
    }

    async fn delete_variants(&self, ids: &[String]) -> RepositoryResult<u64> {
        self.images.write().await.retain(|i| !ids.contains(&i.variant_id));
        let mut variants = self.variants.write().await;
        let before = variants.len();
        variants.retain(|v| !ids.contains(&v.id));
        Ok((before - variants.len()) as u64)
    }

    async fn list_images(&self, variant_ids: &[String]) -> RepositoryResult<Vec<ProductImage>> {
        let mut images: Vec<ProductImage> = self
            .images
            .read()
            .await
            .iter()
            .filter(|i| variant_ids.contains(&i.variant_id))
            .cloned()
            .collect();
        images.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(images)
    }

    async fn replace_images(&self, variant_id: &str, images: Vec<ProductImage>) -> RepositoryResult<Vec<ProductImage>> {
        let mut stored = self.images.write().await;
        stored.retain(|i| i.variant_id != variant_id);
        stored.extend(images.iter().cloned());
        Ok(images)
    }
}
