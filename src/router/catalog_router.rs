use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{middleware, Router};

use crate::handler::catalog_handler::{
    create_category_handler, create_subcategory_handler, delete_category_handler, delete_subcategory_handler,
    list_categories_handler, list_subcategories_handler, update_category_handler, update_subcategory_handler,
    upload_image_handler,
};
use crate::middlewares::session_gate::{session_gate, SessionGateState};
use crate::service::catalog_service::CatalogService;

pub fn catalog_router(service: Arc<dyn CatalogService>, gate: Arc<SessionGateState>) -> Router {
    Router::new()
        .route("/categories", get(list_categories_handler).post(create_category_handler))
        .route("/categories/{id}", put(update_category_handler).delete(delete_category_handler))
        .route("/subcategories", get(list_subcategories_handler).post(create_subcategory_handler))
        .route("/subcategories/{id}", put(update_subcategory_handler).delete(delete_subcategory_handler))
        .route("/images", post(upload_image_handler))
        .route_layer(middleware::from_fn_with_state(gate, session_gate))
        .with_state(service)
}
