use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::catalog::Subcategory;
use crate::model::timestamp::rfc3339_millis;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
    PreOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub subcategory_id: String,
    #[serde(default)]
    pub default_supplier_id: Option<String>,
    #[serde(default)]
    pub is_recommended: bool,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub updated_at: DateTime<Utc>,
}

/// One purchasable size/colour combination of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    #[serde(rename = "_id")]
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub variant_name: Option<String>,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
    pub price: f64,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(rename = "_id")]
    pub id: String,
    pub variant_id: String,
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantDetail {
    #[serde(flatten)]
    pub variant: ProductVariant,
    pub images: Vec<ProductImage>,
}

/// A product with its subcategory, variants and images, as the admin edits it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub subcategory: Option<Subcategory>,
    pub variants: Vec<VariantDetail>,
    /// Stock status of the first variant; a product without variants is out of stock.
    pub stock_status: StockStatus,
}

impl ProductDetail {
    pub fn new(product: Product, subcategory: Option<Subcategory>, variants: Vec<VariantDetail>) -> Self {
        let stock_status = variants
            .first()
            .map(|v| v.variant.stock_status)
            .unwrap_or(StockStatus::OutOfStock);
        ProductDetail { product, subcategory, variants, stock_status }
    }

    pub fn has_stock_status(&self, status: StockStatus) -> bool {
        self.variants.iter().any(|v| v.variant.stock_status == status)
    }
}

/// Product slug: lowercase and trimmed, punctuation dropped, runs of space, `_` and `-`
/// collapsed into one `-`, no leading or trailing `-`.
pub fn product_slug(name: &str) -> String {
    let kept: String = name
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_' || *c == '-')
        .collect();
    kept.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Leaves exactly one default image when there are any: the first one flagged, or else
/// the first one.
pub fn settle_default_image(images: &mut [ProductImage]) {
    let chosen = images.iter().position(|image| image.is_default).unwrap_or(0);
    for (index, image) in images.iter_mut().enumerate() {
        image.is_default = index == chosen;
    }
}
