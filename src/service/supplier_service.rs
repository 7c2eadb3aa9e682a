use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::dto::supplier_dto::{AddSupplierProductRequest, SupplierRequest, UpdateSupplierProductRequest};
use crate::model::product::Product;
use crate::model::supplier::{Supplier, SupplierProduct, SupplierProductDetail};
use crate::repository::product_repo::ProductRepository;
use crate::repository::supplier_repo::SupplierRepository;
use crate::util::error::ServiceError;

#[async_trait]
pub trait SupplierService: Send + Sync {
    async fn list_suppliers(&self) -> Result<Vec<Supplier>, ServiceError>;
    async fn get_supplier(&self, id: &str) -> Result<Supplier, ServiceError>;
    async fn create_supplier(&self, request: SupplierRequest) -> Result<Supplier, ServiceError>;
    async fn update_supplier(&self, id: &str, request: SupplierRequest) -> Result<Supplier, ServiceError>;

    async fn list_supplier_products(&self, supplier_id: &str) -> Result<Vec<SupplierProductDetail>, ServiceError>;
    async fn add_supplier_product(
        &self,
        supplier_id: &str,
        request: AddSupplierProductRequest,
    ) -> Result<SupplierProductDetail, ServiceError>;
    async fn update_supplier_product(
        &self,
        id: &str,
        request: UpdateSupplierProductRequest,
    ) -> Result<SupplierProductDetail, ServiceError>;
}

pub struct SupplierServiceImpl {
    pub supplier_repo: Arc<dyn SupplierRepository>,
    pub product_repo: Arc<dyn ProductRepository>,
}

/// Blank optional text counts as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl SupplierServiceImpl {
    pub fn new(supplier_repo: Arc<dyn SupplierRepository>, product_repo: Arc<dyn ProductRepository>) -> Self {
        SupplierServiceImpl { supplier_repo, product_repo }
    }

    async fn require_supplier(&self, id: &str) -> Result<Supplier, ServiceError> {
        self.supplier_repo
            .get_supplier(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier not found for ID: {}", id)))
    }

    async fn with_product(&self, link: SupplierProduct) -> Result<SupplierProductDetail, ServiceError> {
        let product = self.product_repo.get_product(&link.product_id).await?;
        Ok(SupplierProductDetail { link, product })
    }
}

#[async_trait]
impl SupplierService for SupplierServiceImpl {
    async fn list_suppliers(&self) -> Result<Vec<Supplier>, ServiceError> {
        Ok(self.supplier_repo.list_suppliers().await?)
    }

    async fn get_supplier(&self, id: &str) -> Result<Supplier, ServiceError> {
        self.require_supplier(id).await
    }

    #[instrument(skip(self, request), fields(code = %request.supplier_code))]
    async fn create_supplier(&self, request: SupplierRequest) -> Result<Supplier, ServiceError> {
        let now = Utc::now();
        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            company_name: request.company_name.trim().to_string(),
            contact_name: request.contact_name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            phone: request.phone.trim().to_string(),
            address: request.address,
            status: request.status.unwrap_or_default(),
            product_categories: request.product_categories,
            notes: non_blank(request.notes),
            supplier_code: request.supplier_code.trim().to_string(),
            website_url: non_blank(request.website_url),
            created_at: now,
            updated_at: now,
        };
        let supplier = self.supplier_repo.insert_supplier(supplier).await?;
        info!(id = %supplier.id, "Supplier created");
        Ok(supplier)
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update_supplier(&self, id: &str, request: SupplierRequest) -> Result<Supplier, ServiceError> {
        let existing = self.require_supplier(id).await?;
        let supplier = Supplier {
            company_name: request.company_name.trim().to_string(),
            contact_name: request.contact_name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            phone: request.phone.trim().to_string(),
            address: request.address,
            status: request.status.unwrap_or(existing.status),
            product_categories: request.product_categories,
            notes: non_blank(request.notes),
            supplier_code: request.supplier_code.trim().to_string(),
            website_url: non_blank(request.website_url),
            updated_at: Utc::now(),
            ..existing
        };
        Ok(self.supplier_repo.update_supplier(supplier).await?)
    }

    #[instrument(skip(self), fields(supplier_id = %supplier_id))]
    async fn list_supplier_products(&self, supplier_id: &str) -> Result<Vec<SupplierProductDetail>, ServiceError> {
        self.require_supplier(supplier_id).await?;
        let links = self.supplier_repo.list_supplier_products(supplier_id).await?;
        let product_ids: Vec<String> = links.iter().map(|l| l.product_id.clone()).collect();
        // one read for all linked products
        let products: HashMap<String, Product> = self
            .product_repo
            .list_products(None)
            .await?
            .into_iter()
            .filter(|p| product_ids.contains(&p.id))
            .map(|p| (p.id.clone(), p))
            .collect();
        Ok(links
            .into_iter()
            .map(|link| {
                let product = products.get(&link.product_id).cloned();
                if product.is_none() {
                    warn!(link = %link.id, product = %link.product_id, "Supplier lists a product that no longer exists");
                }
                SupplierProductDetail { link, product }
            })
            .collect())
    }

    #[instrument(skip(self, request), fields(supplier_id = %supplier_id, product_id = %request.product_id))]
    async fn add_supplier_product(
        &self,
        supplier_id: &str,
        request: AddSupplierProductRequest,
    ) -> Result<SupplierProductDetail, ServiceError> {
        self.require_supplier(supplier_id).await?;
        let product = self
            .product_repo
            .get_product(&request.product_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product not found for ID: {}", request.product_id)))?;
        if self
            .supplier_repo
            .find_supplier_product(supplier_id, &product.id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Supplier already lists product {}",
                product.name
            )));
        }
        let now = Utc::now();
        let link = SupplierProduct {
            id: Uuid::new_v4().to_string(),
            supplier_id: supplier_id.to_string(),
            product_id: product.id.clone(),
            supplier_product_url: non_blank(request.supplier_product_url),
            supplier_product_code: non_blank(request.supplier_product_code),
            supplier_price: request.supplier_price,
            is_active: true,
            notes: non_blank(request.notes),
            created_at: now,
            updated_at: now,
            last_checked: now,
        };
        let link = self.supplier_repo.insert_supplier_product(link).await?;
        info!(id = %link.id, "Product added to supplier");
        Ok(SupplierProductDetail { link, product: Some(product) })
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update_supplier_product(
        &self,
        id: &str,
        request: UpdateSupplierProductRequest,
    ) -> Result<SupplierProductDetail, ServiceError> {
        let existing = self
            .supplier_repo
            .get_supplier_product(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier product not found for ID: {}", id)))?;
        let link = SupplierProduct {
            supplier_product_code: request.supplier_product_code.map_or(existing.supplier_product_code, |code| {
                non_blank(Some(code))
            }),
            supplier_product_url: request
                .supplier_product_url
                .map_or(existing.supplier_product_url, |url| non_blank(Some(url))),
            supplier_price: request.supplier_price.unwrap_or(existing.supplier_price),
            is_active: request.is_active.unwrap_or(existing.is_active),
            notes: request.notes.map_or(existing.notes, |notes| non_blank(Some(notes))),
            updated_at: Utc::now(),
            ..existing
        };
        let link = self.supplier_repo.update_supplier_product(link).await?;
        self.with_product(link).await
    }
}
