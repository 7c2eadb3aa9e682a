use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::{debug, error};
use validator::Validate;

use crate::dto::catalog_dto::{CategoryRequest, ImageFolder, ImageUpload, SubcategoryListParams, SubcategoryRequest};
use crate::service::catalog_service::CatalogService;
use crate::util::error::HandlerError;

pub async fn list_categories_handler(
    State(service): State<Arc<dyn CatalogService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_categories().await?))
}

pub async fn create_category_handler(
    State(service): State<Arc<dyn CatalogService>>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let created = service.create_category(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_category_handler(
    State(service): State<Arc<dyn CatalogService>>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    Ok(Json(service.update_category(&id, payload).await?))
}

pub async fn delete_category_handler(
    State(service): State<Arc<dyn CatalogService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete_category(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_subcategories_handler(
    State(service): State<Arc<dyn CatalogService>>,
    Query(params): Query<SubcategoryListParams>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_subcategories(params.category_id.as_deref()).await?))
}

pub async fn create_subcategory_handler(
    State(service): State<Arc<dyn CatalogService>>,
    Json(payload): Json<SubcategoryRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let created = service.create_subcategory(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_subcategory_handler(
    State(service): State<Arc<dyn CatalogService>>,
    Path(id): Path<String>,
    Json(payload): Json<SubcategoryRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    Ok(Json(service.update_subcategory(&id, payload).await?))
}

pub async fn delete_subcategory_handler(
    State(service): State<Arc<dyn CatalogService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete_subcategory(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /images (multipart: `folder`, `file`)
pub async fn upload_image_handler(
    State(service): State<Arc<dyn CatalogService>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let mut folder: Option<ImageFolder> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Error getting next multipart field: {}", e);
        HandlerError::bad_request(format!("Failed to read multipart body: {}", e))
    })? {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        debug!("Processing field: {}", name);
        match name.as_str() {
            "folder" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| HandlerError::bad_request(format!("Failed to read folder: {}", e)))?;
                folder = Some(raw.parse::<ImageFolder>().map_err(HandlerError::bad_request)?);
            }
            "file" => {
                let file_name = field.file_name().map(|s| s.to_string()).unwrap_or_default();
                let content_type = field.content_type().map(|s| s.to_string()).unwrap_or_default();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| HandlerError::bad_request(format!("Failed to read file: {}", e)))?;
                file = Some((file_name, content_type, data.to_vec()));
            }
            _ => debug!("Ignoring unexpected field: {}", name),
        }
    }

    let folder = folder.ok_or_else(|| HandlerError::bad_request("Missing folder field"))?;
    let (file_name, content_type, data) = file.ok_or_else(|| HandlerError::bad_request("Missing file field"))?;
    if file_name.is_empty() {
        return Err(HandlerError::bad_request("Uploaded file has no name"));
    }

    let url = service
        .upload_image(ImageUpload { folder, file_name, content_type, data })
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "url": url }))))
}
