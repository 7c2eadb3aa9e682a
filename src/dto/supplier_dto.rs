use serde::Deserialize;
use validator::Validate;

use crate::model::quote::DeliveryAddress;
use crate::model::supplier::SupplierStatus;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SupplierRequest {
    #[validate(length(min = 1, max = 200))]
    pub company_name: String,
    #[validate(length(min = 1, max = 200))]
    pub contact_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 50))]
    pub phone: String,
    pub address: DeliveryAddress,
    pub status: Option<SupplierStatus>,
    #[serde(default)]
    pub product_categories: Vec<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub supplier_code: String,
    #[validate(url)]
    pub website_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddSupplierProductRequest {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(length(max = 100))]
    pub supplier_product_code: Option<String>,
    #[validate(url)]
    pub supplier_product_url: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub supplier_price: f64,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Fields left out keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSupplierProductRequest {
    #[validate(length(max = 100))]
    pub supplier_product_code: Option<String>,
    #[validate(url)]
    pub supplier_product_url: Option<String>,
    #[validate(range(min = 0.0))]
    pub supplier_price: Option<f64>,
    pub is_active: Option<bool>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}
