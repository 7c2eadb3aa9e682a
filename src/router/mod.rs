pub mod auth_router;
pub mod catalog_router;
pub mod dashboard_router;
pub mod product_router;
pub mod quote_router;
pub mod supplier_router;
