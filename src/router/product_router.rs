use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{middleware, Router};

use crate::handler::product_handler::{
    add_variant_handler, create_product_handler, delete_product_handler, delete_variant_handler, get_product_handler,
    list_products_handler, product_stats_handler, update_product_handler, update_variant_handler,
};
use crate::middlewares::session_gate::{session_gate, SessionGateState};
use crate::service::product_service::ProductService;

pub fn product_router(service: Arc<dyn ProductService>, gate: Arc<SessionGateState>) -> Router {
    Router::new()
        .route("/products", get(list_products_handler).post(create_product_handler))
        .route("/products/stats", get(product_stats_handler))
        .route(
            "/products/{id}",
            get(get_product_handler).put(update_product_handler).delete(delete_product_handler),
        )
        .route("/products/{id}/variants", post(add_variant_handler))
        .route("/variants/{id}", put(update_variant_handler).delete(delete_variant_handler))
        .route_layer(middleware::from_fn_with_state(gate, session_gate))
        .with_state(service)
}
