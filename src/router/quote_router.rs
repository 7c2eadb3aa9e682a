use std::sync::Arc;

use axum::routing::{get, put};
use axum::{middleware, Router};

use crate::handler::quote_handler::{
    delete_quote_handler, export_quote_handler, export_quotes_handler, get_quote_handler, list_quotes_handler,
    quote_stats_handler, update_quote_status_handler,
};
use crate::middlewares::session_gate::{session_gate, SessionGateState};
use crate::service::quote_service::QuoteService;

pub fn quote_router(service: Arc<dyn QuoteService>, gate: Arc<SessionGateState>) -> Router {
    Router::new()
        .route("/quotes", get(list_quotes_handler))
        .route("/quotes/stats", get(quote_stats_handler))
        .route("/quotes/export", get(export_quotes_handler))
        .route("/quotes/{id}", get(get_quote_handler).delete(delete_quote_handler))
        .route("/quotes/{id}/status", put(update_quote_status_handler))
        .route("/quotes/{id}/export", get(export_quote_handler))
        .route_layer(middleware::from_fn_with_state(gate, session_gate))
        .with_state(service)
}
