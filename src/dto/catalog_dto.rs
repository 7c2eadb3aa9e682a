use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Derived from the name when absent.
    #[validate(length(min = 1, max = 120))]
    pub slug: Option<String>,
    #[validate(url)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubcategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 120))]
    pub slug: Option<String>,
    #[validate(length(min = 1))]
    pub category_id: String,
    #[validate(url)]
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubcategoryListParams {
    pub category_id: Option<String>,
}

/// Where an uploaded image is filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFolder {
    Category,
    Subcategory,
    Product,
}

impl ImageFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFolder::Category => "category-images",
            ImageFolder::Subcategory => "subcategory-images",
            ImageFolder::Product => "product-images",
        }
    }
}

impl std::str::FromStr for ImageFolder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "category-images" => Ok(ImageFolder::Category),
            "subcategory-images" => Ok(ImageFolder::Subcategory),
            "product-images" => Ok(ImageFolder::Product),
            other => Err(format!("Unknown image folder: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub folder: ImageFolder,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}
