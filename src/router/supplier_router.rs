use std::sync::Arc;

use axum::routing::{get, patch};
use axum::{middleware, Router};

use crate::handler::supplier_handler::{
    add_supplier_product_handler, create_supplier_handler, get_supplier_handler, list_supplier_products_handler,
    list_suppliers_handler, update_supplier_handler, update_supplier_product_handler,
};
use crate::middlewares::session_gate::{session_gate, SessionGateState};
use crate::service::supplier_service::SupplierService;

pub fn supplier_router(service: Arc<dyn SupplierService>, gate: Arc<SessionGateState>) -> Router {
    Router::new()
        .route("/suppliers", get(list_suppliers_handler).post(create_supplier_handler))
        .route("/suppliers/{id}", get(get_supplier_handler).put(update_supplier_handler))
        .route(
            "/suppliers/{id}/products",
            get(list_supplier_products_handler).post(add_supplier_product_handler),
        )
        .route("/supplier-products/{id}", patch(update_supplier_product_handler))
        .route_layer(middleware::from_fn_with_state(gate, session_gate))
        .with_state(service)
}
