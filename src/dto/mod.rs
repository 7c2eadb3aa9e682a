pub mod auth_dto;
pub mod catalog_dto;
pub mod dashboard_dto;
pub mod product_dto;
pub mod quote_dto;
pub mod supplier_dto;
