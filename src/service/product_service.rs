use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::dto::product_dto::{
    CreateProductRequest, ImageRequest, ProductListParams, ProductStats, UpdateProductRequest, VariantRequest,
};
use crate::model::catalog::Subcategory;
use crate::model::product::{
    product_slug, settle_default_image, Product, ProductDetail, ProductImage, ProductVariant, VariantDetail,
};
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::product_repo::ProductRepository;
use crate::repository::supplier_repo::SupplierRepository;
use crate::util::error::ServiceError;

#[async_trait]
pub trait ProductService: Send + Sync {
    async fn list_products(&self, params: ProductListParams) -> Result<Vec<ProductDetail>, ServiceError>;
    async fn product_stats(&self) -> Result<ProductStats, ServiceError>;
    async fn get_product(&self, id: &str) -> Result<ProductDetail, ServiceError>;
    async fn create_product(&self, request: CreateProductRequest) -> Result<ProductDetail, ServiceError>;
    async fn update_product(&self, id: &str, request: UpdateProductRequest) -> Result<ProductDetail, ServiceError>;
    /// Removes the product with its variants, images and supplier links.
    async fn delete_product(&self, id: &str) -> Result<(), ServiceError>;

    async fn add_variant(&self, product_id: &str, request: VariantRequest) -> Result<VariantDetail, ServiceError>;
    /// Rewrites the variant; `request.images` becomes its complete image set.
    async fn update_variant(&self, id: &str, request: VariantRequest) -> Result<VariantDetail, ServiceError>;
    async fn delete_variant(&self, id: &str) -> Result<(), ServiceError>;
}

pub struct ProductServiceImpl {
    pub product_repo: Arc<dyn ProductRepository>,
    pub catalog_repo: Arc<dyn CatalogRepository>,
    pub supplier_repo: Arc<dyn SupplierRepository>,
}

fn product_not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("Product not found for ID: {}", id))
}

fn variant_not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("Variant not found for ID: {}", id))
}

fn slug_for(explicit: Option<String>, name: &str) -> Result<String, ServiceError> {
    let slug = explicit.map(|s| s.trim().to_string()).unwrap_or_else(|| product_slug(name));
    if slug.is_empty() {
        return Err(ServiceError::InvalidInput("Slug must not be empty".to_string()));
    }
    Ok(slug)
}

/// Image rows for a variant. Missing alt text becomes `"<product> - <variant name or size>"`.
fn image_rows(
    variant: &ProductVariant,
    product_name: &str,
    images: Vec<ImageRequest>,
    now: DateTime<Utc>,
) -> Vec<ProductImage> {
    let label = variant
        .variant_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(variant.size.as_str());
    let mut rows: Vec<ProductImage> = images
        .into_iter()
        .enumerate()
        .map(|(index, image)| ProductImage {
            id: Uuid::new_v4().to_string(),
            variant_id: variant.id.clone(),
            url: image.url,
            alt: image.alt.or_else(|| Some(format!("{} - {}", product_name, label))),
            is_default: image.is_default,
            // keeps upload order when read back oldest first
            created_at: now + Duration::milliseconds(index as i64),
        })
        .collect();
    settle_default_image(&mut rows);
    rows
}

fn variant_row(product_id: &str, request: &VariantRequest, id: String, created_at: DateTime<Utc>) -> ProductVariant {
    ProductVariant {
        id,
        product_id: product_id.to_string(),
        variant_name: request.variant_name.clone(),
        size: request.size.trim().to_string(),
        color: request.color.trim().to_string(),
        price: request.price,
        stock_status: request.stock_status.unwrap_or_default(),
        created_at,
    }
}

impl ProductServiceImpl {
    pub fn new(
        product_repo: Arc<dyn ProductRepository>,
        catalog_repo: Arc<dyn CatalogRepository>,
        supplier_repo: Arc<dyn SupplierRepository>,
    ) -> Self {
        ProductServiceImpl { product_repo, catalog_repo, supplier_repo }
    }

    async fn require_product(&self, id: &str) -> Result<Product, ServiceError> {
        self.product_repo.get_product(id).await?.ok_or_else(|| product_not_found(id))
    }

    async fn require_subcategory(&self, id: &str) -> Result<Subcategory, ServiceError> {
        self.catalog_repo
            .get_subcategory(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Subcategory not found for ID: {}", id)))
    }

    async fn require_supplier(&self, id: Option<&str>) -> Result<(), ServiceError> {
        if let Some(id) = id {
            if self.supplier_repo.get_supplier(id).await?.is_none() {
                return Err(ServiceError::NotFound(format!("Supplier not found for ID: {}", id)));
            }
        }
        Ok(())
    }

    /// Attaches subcategories, variants and images to `products` with three reads.
    async fn details(&self, products: Vec<Product>) -> Result<Vec<ProductDetail>, ServiceError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }
        let product_ids: Vec<String> = products.iter().map(|p| p.id.clone()).collect();
        let variants = self.product_repo.list_variants(&product_ids).await?;
        let variant_ids: Vec<String> = variants.iter().map(|v| v.id.clone()).collect();
        let images = if variant_ids.is_empty() {
            Vec::new()
        } else {
            self.product_repo.list_images(&variant_ids).await?
        };
        let subcategories: HashMap<String, Subcategory> = self
            .catalog_repo
            .list_subcategories(None)
            .await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        let mut images_by_variant: HashMap<String, Vec<ProductImage>> = HashMap::new();
        for image in images {
            images_by_variant.entry(image.variant_id.clone()).or_default().push(image);
        }
        let mut variants_by_product: HashMap<String, Vec<VariantDetail>> = HashMap::new();
        for variant in variants {
            let images = images_by_variant.remove(&variant.id).unwrap_or_default();
            variants_by_product
                .entry(variant.product_id.clone())
                .or_default()
                .push(VariantDetail { variant, images });
        }

        Ok(products
            .into_iter()
            .map(|product| {
                let subcategory = subcategories.get(&product.subcategory_id).cloned();
                let variants = variants_by_product.remove(&product.id).unwrap_or_default();
                ProductDetail::new(product, subcategory, variants)
            })
            .collect())
    }

    async fn detail(&self, product: Product) -> Result<ProductDetail, ServiceError> {
        let id = product.id.clone();
        self.details(vec![product])
            .await?
            .pop()
            .ok_or_else(|| product_not_found(&id))
    }

    async fn store_variant(
        &self,
        product: &Product,
        request: VariantRequest,
        now: DateTime<Utc>,
    ) -> Result<VariantDetail, ServiceError> {
        let variant = variant_row(&product.id, &request, Uuid::new_v4().to_string(), now);
        let variant = self.product_repo.insert_variant(variant).await?;
        let rows = image_rows(&variant, &product.name, request.images, now);
        let images = self.product_repo.replace_images(&variant.id, rows).await?;
        Ok(VariantDetail { variant, images })
    }
}

#[async_trait]
impl ProductService for ProductServiceImpl {
    #[instrument(skip(self, params))]
    async fn list_products(&self, params: ProductListParams) -> Result<Vec<ProductDetail>, ServiceError> {
        let subcategory_ids: Option<Vec<String>> = match (&params.subcategory_id, &params.category_id) {
            (Some(subcategory_id), _) => Some(vec![subcategory_id.clone()]),
            (None, Some(category_id)) => Some(
                self.catalog_repo
                    .list_subcategories(Some(category_id.as_str()))
                    .await?
                    .into_iter()
                    .map(|s| s.id)
                    .collect(),
            ),
            (None, None) => None,
        };
        if subcategory_ids.as_ref().is_some_and(|ids| ids.is_empty()) {
            return Ok(Vec::new());
        }
        let products = self.product_repo.list_products(subcategory_ids.as_deref()).await?;
        let mut details = self.details(products).await?;
        if let Some(status) = params.stock_status {
            details.retain(|d| d.has_stock_status(status));
        }
        info!("Fetched {} products", details.len());
        Ok(details)
    }

    async fn product_stats(&self) -> Result<ProductStats, ServiceError> {
        let products = self.product_repo.list_products(None).await?;
        let subcategories: HashMap<String, Subcategory> = self
            .catalog_repo
            .list_subcategories(None)
            .await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let used: HashSet<&str> = products
            .iter()
            .map(|p| p.subcategory_id.as_str())
            .filter(|id| subcategories.contains_key(*id))
            .collect();
        let categories: HashSet<&str> = used
            .iter()
            .filter_map(|id| subcategories.get(*id))
            .map(|s| s.category_id.as_str())
            .collect();
        Ok(ProductStats {
            total_products: products.len() as u64,
            total_categories: categories.len() as u64,
            total_subcategories: used.len() as u64,
        })
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_product(&self, id: &str) -> Result<ProductDetail, ServiceError> {
        let product = self.require_product(id).await?;
        self.detail(product).await
    }

    #[instrument(skip(self, request), fields(name = %request.name, subcategory_id = %request.subcategory_id))]
    async fn create_product(&self, request: CreateProductRequest) -> Result<ProductDetail, ServiceError> {
        let subcategory = self.require_subcategory(&request.subcategory_id).await?;
        self.require_supplier(request.default_supplier_id.as_deref()).await?;
        let slug = slug_for(request.slug, &request.name)?;
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            slug,
            description: request.description,
            subcategory_id: subcategory.id.clone(),
            default_supplier_id: request.default_supplier_id,
            is_recommended: request.is_recommended,
            created_at: now,
            updated_at: now,
        };
        let product = self.product_repo.insert_product(product).await?;

        let requests = if request.variants.is_empty() {
            vec![VariantRequest::default()]
        } else {
            request.variants
        };
        let mut variants = Vec::with_capacity(requests.len());
        for (index, variant) in requests.into_iter().enumerate() {
            let created_at = now + Duration::milliseconds(index as i64);
            variants.push(self.store_variant(&product, variant, created_at).await?);
        }
        info!(id = %product.id, variants = variants.len(), "Product created");
        Ok(ProductDetail::new(product, Some(subcategory), variants))
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update_product(&self, id: &str, request: UpdateProductRequest) -> Result<ProductDetail, ServiceError> {
        let existing = self.require_product(id).await?;
        if existing.subcategory_id != request.subcategory_id {
            self.require_subcategory(&request.subcategory_id).await?;
        }
        self.require_supplier(request.default_supplier_id.as_deref()).await?;
        let slug = slug_for(request.slug, &request.name)?;
        let product = Product {
            name: request.name.trim().to_string(),
            slug,
            description: request.description,
            subcategory_id: request.subcategory_id,
            default_supplier_id: request.default_supplier_id,
            is_recommended: request.is_recommended.unwrap_or(existing.is_recommended),
            updated_at: Utc::now(),
            ..existing
        };
        let product = self.product_repo.update_product(product).await?;
        self.detail(product).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_product(&self, id: &str) -> Result<(), ServiceError> {
        self.require_product(id).await?;
        let variant_ids: Vec<String> = self
            .product_repo
            .list_variants(&[id.to_string()])
            .await?
            .into_iter()
            .map(|v| v.id)
            .collect();
        let variants = self.product_repo.delete_variants(&variant_ids).await?;
        let links = self.supplier_repo.delete_links_to_product(id).await?;
        self.product_repo.delete_product(id).await?;
        info!(variants, links, "Product deleted");
        Ok(())
    }

    #[instrument(skip(self, request), fields(product_id = %product_id))]
    async fn add_variant(&self, product_id: &str, request: VariantRequest) -> Result<VariantDetail, ServiceError> {
        let product = self.require_product(product_id).await?;
        self.store_variant(&product, request, Utc::now()).await
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update_variant(&self, id: &str, request: VariantRequest) -> Result<VariantDetail, ServiceError> {
        let existing = self.product_repo.get_variant(id).await?.ok_or_else(|| variant_not_found(id))?;
        let product = self.require_product(&existing.product_id).await?;
        let variant = variant_row(&product.id, &request, existing.id, existing.created_at);
        let variant = self.product_repo.update_variant(variant).await?;
        let rows = image_rows(&variant, &product.name, request.images, Utc::now());
        let images = self.product_repo.replace_images(&variant.id, rows).await?;
        Ok(VariantDetail { variant, images })
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_variant(&self, id: &str) -> Result<(), ServiceError> {
        let deleted = self.product_repo.delete_variants(&[id.to_string()]).await?;
        if deleted == 0 {
            warn!("No variant to delete");
            return Err(variant_not_found(id));
        }
        info!("Variant deleted");
        Ok(())
    }
}
