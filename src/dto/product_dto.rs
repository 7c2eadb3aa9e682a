use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::product::StockStatus;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ImageRequest {
    #[validate(url)]
    pub url: String,
    #[validate(length(max = 200))]
    pub alt: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// A variant with the full set of images it should end up with.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VariantRequest {
    #[validate(length(max = 100))]
    pub variant_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub size: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub color: String,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub stock_status: Option<StockStatus>,
    #[serde(default)]
    #[validate(nested)]
    pub images: Vec<ImageRequest>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 220))]
    pub slug: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub subcategory_id: String,
    pub default_supplier_id: Option<String>,
    #[serde(default)]
    pub is_recommended: bool,
    /// A product created without variants gets one blank variant.
    #[serde(default)]
    #[validate(nested)]
    pub variants: Vec<VariantRequest>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 220))]
    pub slug: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub subcategory_id: String,
    pub default_supplier_id: Option<String>,
    pub is_recommended: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListParams {
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    /// Matches products with at least one variant in this status.
    pub stock_status: Option<StockStatus>,
}

/// Header figures of the product list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductStats {
    pub total_products: u64,
    /// Distinct categories that have at least one product.
    pub total_categories: u64,
    /// Distinct subcategories that have at least one product.
    pub total_subcategories: u64,
}
