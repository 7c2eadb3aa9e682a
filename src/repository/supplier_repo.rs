use async_trait::async_trait;
use bson::doc;
use futures::stream::TryStreamExt;
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Collection, Database, IndexModel};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::model::supplier::{Supplier, SupplierProduct};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait SupplierRepository: Send + Sync {
    /// Ordered by company name.
    async fn list_suppliers(&self) -> RepositoryResult<Vec<Supplier>>;
    async fn get_supplier(&self, id: &str) -> RepositoryResult<Option<Supplier>>;
    async fn insert_supplier(&self, supplier: Supplier) -> RepositoryResult<Supplier>;
    async fn update_supplier(&self, supplier: Supplier) -> RepositoryResult<Supplier>;

    /// Newest first.
    async fn list_supplier_products(&self, supplier_id: &str) -> RepositoryResult<Vec<SupplierProduct>>;
    async fn get_supplier_product(&self, id: &str) -> RepositoryResult<Option<SupplierProduct>>;
    async fn find_supplier_product(&self, supplier_id: &str, product_id: &str) -> RepositoryResult<Option<SupplierProduct>>;
    async fn insert_supplier_product(&self, link: SupplierProduct) -> RepositoryResult<SupplierProduct>;
    async fn update_supplier_product(&self, link: SupplierProduct) -> RepositoryResult<SupplierProduct>;
    /// Drops every supplier link of a product. Returns how many went.
    async fn delete_links_to_product(&self, product_id: &str) -> RepositoryResult<u64>;
}

pub struct MongoSupplierRepository {
    suppliers: Collection<Supplier>,
    supplier_products: Collection<SupplierProduct>,
}

impl MongoSupplierRepository {
    pub fn new(db: &Database) -> Self {
        MongoSupplierRepository {
            suppliers: db.collection::<Supplier>("suppliers"),
            supplier_products: db.collection::<SupplierProduct>("supplier_products"),
        }
    }

    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        let unique = || IndexOptions::builder().unique(true).build();
        self.suppliers
            .create_index(
                IndexModel::builder().keys(doc! { "supplier_code": 1 }).options(unique()).build(),
                None,
            )
            .await?;
        self.supplier_products
            .create_indexes(
                vec![
                    IndexModel::builder()
                        .keys(doc! { "supplier_id": 1, "product_id": 1 })
                        .options(unique())
                        .build(),
                    IndexModel::builder().keys(doc! { "product_id": 1 }).build(),
                ],
                None,
            )
            .await?;
        info!("Supplier indexes ensured");
        Ok(())
    }
}

#[async_trait]
impl SupplierRepository for MongoSupplierRepository {
    async fn list_suppliers(&self) -> RepositoryResult<Vec<Supplier>> {
        let options = FindOptions::builder().sort(doc! { "company_name": 1 }).build();
        let cursor = self.suppliers.find(None, options).await?;
        Ok(cursor.try_collect().await?)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_supplier(&self, id: &str) -> RepositoryResult<Option<Supplier>> {
        Ok(self.suppliers.find_one(doc! { "_id": id }, None).await?)
    }

    #[tracing::instrument(skip(self, supplier), fields(code = %supplier.supplier_code))]
    async fn insert_supplier(&self, supplier: Supplier) -> RepositoryResult<Supplier> {
        match self.suppliers.insert_one(&supplier, None).await {
            Ok(_) => {
                info!("Supplier created");
                Ok(supplier)
            }
            Err(e) => {
                error!("Failed to create supplier: {}", e);
                Err(e.into())
            }
        }
    }

    #[tracing::instrument(skip(self, supplier), fields(id = %supplier.id))]
    async fn update_supplier(&self, supplier: Supplier) -> RepositoryResult<Supplier> {
        let result = self
            .suppliers
            .replace_one(doc! { "_id": supplier.id.as_str() }, &supplier, None)
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Supplier not found for ID: {}", supplier.id)));
        }
        Ok(supplier)
    }

    async fn list_supplier_products(&self, supplier_id: &str) -> RepositoryResult<Vec<SupplierProduct>> {
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let cursor = self
            .supplier_products
            .find(doc! { "supplier_id": supplier_id }, options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn get_supplier_product(&self, id: &str) -> RepositoryResult<Option<SupplierProduct>> {
        Ok(self.supplier_products.find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_supplier_product(&self, supplier_id: &str, product_id: &str) -> RepositoryResult<Option<SupplierProduct>> {
        Ok(self
            .supplier_products
            .find_one(doc! { "supplier_id": supplier_id, "product_id": product_id }, None)
            .await?)
    }

    #[tracing::instrument(skip(self, link), fields(supplier_id = %link.supplier_id, product_id = %link.product_id))]
    async fn insert_supplier_product(&self, link: SupplierProduct) -> RepositoryResult<SupplierProduct> {
        self.supplier_products.insert_one(&link, None).await?;
        info!("Supplier product linked");
        Ok(link)
    }

    #[tracing::instrument(skip(self, link), fields(id = %link.id))]
    async fn update_supplier_product(&self, link: SupplierProduct) -> RepositoryResult<SupplierProduct> {
        let result = self
            .supplier_products
            .replace_one(doc! { "_id": link.id.as_str() }, &link, None)
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Supplier product not found for ID: {}", link.id)));
        }
        Ok(link)
    }

    #[tracing::instrument(skip(self), fields(product_id = %product_id))]
    async fn delete_links_to_product(&self, product_id: &str) -> RepositoryResult<u64> {
        let result = self
            .supplier_products
            .delete_many(doc! { "product_id": product_id }, None)
            .await?;
        Ok(result.deleted_count)
    }
}

#[derive(Default)]
pub struct InMemorySupplierRepository {
    suppliers: RwLock<Vec<Supplier>>,
    supplier_products: RwLock<Vec<SupplierProduct>>,
}

impl InMemorySupplierRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SupplierRepository for InMemorySupplierRepository {
    async fn list_suppliers(&self) -> RepositoryResult<Vec<Supplier>> {
        let mut suppliers = self.suppliers.read().await.clone();
        suppliers.sort_by(|a, b| a.company_name.cmp(&b.company_name));
        Ok(suppliers)
    }

    async fn get_supplier(&self, id: &str) -> RepositoryResult<Option<Supplier>> {
        Ok(self.suppliers.read().await.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_supplier(&self, supplier: Supplier) -> RepositoryResult<Supplier> {
        let mut suppliers = self.suppliers.write().await;
        if suppliers.iter().any(|s| s.supplier_code == supplier.supplier_code) {
            return Err(RepositoryError::already_exists(format!(
                "Duplicate key: supplier_code {}",
                supplier.supplier_code
            )));
        }
        suppliers.push(supplier.clone());
        Ok(supplier)
    }

    async fn update_supplier(&self, supplier: Supplier) -> RepositoryResult<Supplier> {
        let mut suppliers = self.suppliers.write().await;
        if suppliers
            .iter()
            .any(|s| s.supplier_code == supplier.supplier_code && s.id != supplier.id)
        {
            return Err(RepositoryError::already_exists(format!(
                "Duplicate key: supplier_code {}",
                supplier.supplier_code
            )));
        }
        let slot = suppliers
            .iter_mut()
            .find(|s| s.id == supplier.id)
            .ok_or_else(|| RepositoryError::not_found(format!("Supplier not found for ID: {}", supplier.id)))?;
        *slot = supplier.clone();
        Ok(supplier)
    }

    async fn list_supplier_products(&self, supplier_id: &str) -> RepositoryResult<Vec<SupplierProduct>> {
        let mut links: Vec<SupplierProduct> = self
            .supplier_products
            .read()
            .await
            .iter()
            .filter(|l| l.supplier_id == supplier_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn get_supplier_product(&self, id: &str) -> RepositoryResult<Option<SupplierProduct>> {
        Ok(self.supplier_products.read().await.iter().find(|l| l.id == id).cloned())
    }

    async fn find_supplier_product(&self, supplier_id: &str, product_id: &str) -> RepositoryResult<Option<SupplierProduct>> {
        Ok(self
            .supplier_products
            .read()
            .await
            .iter()
            .find(|l| l.supplier_id == supplier_id && l.product_id == product_id)
            .cloned())
    }

    async fn insert_supplier_product(&self, link: SupplierProduct) -> RepositoryResult<SupplierProduct> {
        let mut links = self.supplier_products.write().await;
        if links
            .iter()
            .any(|l| l.supplier_id == link.supplier_id && l.product_id == link.product_id)
        {
            return Err(RepositoryError::already_exists(format!(
                "Duplicate key: supplier {} already lists product {}",
                link.supplier_id, link.product_id
            )));
        }
        links.push(link.clone());
        Ok(link)
    }

    async fn update_supplier_product(&self, link: SupplierProduct) -> RepositoryResult<SupplierProduct> {
        let mut links = self.supplier_products.write().await;
        let slot = links
            .iter_mut()
            .find(|l| l.id == link.id)
            .ok_or_else(|| RepositoryError::not_found(format!("Supplier product not found for ID: {}", link.id)))?;
        *slot = link.clone();
        Ok(link)
    }

    async fn delete_links_to_product(&self, product_id: &str) -> RepositoryResult<u64> {
        let mut links = self.supplier_products.write().await;
        let before = links.len();
        links.retain(|l| l.product_id != product_id);
        Ok((before - links.len()) as u64)
    }
}
