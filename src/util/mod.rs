pub mod error;
pub mod jwt;
pub mod logger;
pub mod minio;
pub mod password;
pub mod session_store;
pub mod storage;
