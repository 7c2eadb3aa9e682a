use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use crate::dto::supplier_dto::{AddSupplierProductRequest, SupplierRequest, UpdateSupplierProductRequest};
use crate::service::supplier_service::SupplierService;
use crate::util::error::HandlerError;

pub async fn list_suppliers_handler(
    State(service): State<Arc<dyn SupplierService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_suppliers().await?))
}

pub async fn get_supplier_handler(
    State(service): State<Arc<dyn SupplierService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.get_supplier(&id).await?))
}

pub async fn create_supplier_handler(
    State(service): State<Arc<dyn SupplierService>>,
    Json(payload): Json<SupplierRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let created = service.create_supplier(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_supplier_handler(
    State(service): State<Arc<dyn SupplierService>>,
    Path(id): Path<String>,
    Json(payload): Json<SupplierRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    Ok(Json(service.update_supplier(&id, payload).await?))
}

// GET /suppliers/{id}/products
pub async fn list_supplier_products_handler(
    State(service): State<Arc<dyn SupplierService>>,
    Path(supplier_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_supplier_products(&supplier_id).await?))
}

// POST /suppliers/{id}/products
pub async fn add_supplier_product_handler(
    State(service): State<Arc<dyn SupplierService>>,
    Path(supplier_id): Path<String>,
    Json(payload): Json<AddSupplierProductRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let created = service.add_supplier_product(&supplier_id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// PATCH /supplier-products/{id}
pub async fn update_supplier_product_handler(
    State(service): State<Arc<dyn SupplierService>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateSupplierProductRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    Ok(Json(service.update_supplier_product(&id, payload).await?))
}
