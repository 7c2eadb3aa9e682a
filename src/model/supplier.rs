use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::product::Product;
use crate::model::quote::DeliveryAddress;
use crate::model::timestamp::rfc3339_millis;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(rename = "_id")]
    pub id: String,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub address: DeliveryAddress,
    #[serde(default)]
    pub status: SupplierStatus,
    #[serde(default)]
    pub product_categories: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub supplier_code: String,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub updated_at: DateTime<Utc>,
}

/// A product a supplier sells, with the supplier's own code, page and price for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierProduct {
    #[serde(rename = "_id")]
    pub id: String,
    pub supplier_id: String,
    pub product_id: String,
    #[serde(default)]
    pub supplier_product_url: Option<String>,
    #[serde(default)]
    pub supplier_product_code: Option<String>,
    #[serde(default)]
    pub supplier_price: f64,
    pub is_active: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub updated_at: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub last_checked: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierProductDetail {
    #[serde(flatten)]
    pub link: SupplierProduct,
    /// `None` when the product has since been removed from the catalog.
    pub product: Option<Product>,
}
