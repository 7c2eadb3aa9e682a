use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use crate::dto::product_dto::{CreateProductRequest, ProductListParams, UpdateProductRequest, VariantRequest};
use crate::service::product_service::ProductService;
use crate::util::error::HandlerError;

// GET /products?category_id=&subcategory_id=&stock_status=
pub async fn list_products_handler(
    State(service): State<Arc<dyn ProductService>>,
    Query(params): Query<ProductListParams>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_products(params).await?))
}

pub async fn product_stats_handler(
    State(service): State<Arc<dyn ProductService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.product_stats().await?))
}

pub async fn get_product_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.get_product(&id).await?))
}

pub async fn create_product_handler(
    State(service): State<Arc<dyn ProductService>>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let created = service.create_product(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_product_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    Ok(Json(service.update_product(&id, payload).await?))
}

pub async fn delete_product_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /products/{id}/variants
pub async fn add_variant_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(product_id): Path<String>,
    Json(payload): Json<VariantRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let created = service.add_variant(&product_id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_variant_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(id): Path<String>,
    Json(payload): Json<VariantRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    Ok(Json(service.update_variant(&id, payload).await?))
}

pub async fn delete_variant_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete_variant(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
