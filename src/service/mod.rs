pub mod auth_service;
pub mod catalog_service;
pub mod dashboard_service;
pub mod product_service;
pub mod quote_service;
pub mod supplier_service;
