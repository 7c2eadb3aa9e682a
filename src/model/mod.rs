pub mod catalog;
pub mod dashboard;
pub mod product;
pub mod quote;
pub mod quote_status;
pub mod supplier;
pub mod timestamp;
pub mod user;
