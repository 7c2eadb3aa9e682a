use std::sync::Arc;

use axum::routing::get;
use axum::{middleware, Router};

use crate::handler::dashboard_handler::{
    category_sales_handler, dashboard_stats_handler, order_trends_handler, recent_orders_handler,
    top_products_handler,
};
use crate::middlewares::session_gate::{session_gate, SessionGateState};
use crate::service::dashboard_service::DashboardService;

pub fn dashboard_router(service: Arc<dyn DashboardService>, gate: Arc<SessionGateState>) -> Router {
    Router::new()
        .route("/dashboard/stats", get(dashboard_stats_handler))
        .route("/dashboard/trends", get(order_trends_handler))
        .route("/dashboard/top-products", get(top_products_handler))
        .route("/dashboard/category-sales", get(category_sales_handler))
        .route("/dashboard/recent-orders", get(recent_orders_handler))
        .route_layer(middleware::from_fn_with_state(gate, session_gate))
        .with_state(service)
}
