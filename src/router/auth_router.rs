use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware, Router};

use crate::handler::auth_handler::{login_handler, logout_handler, refresh_token_handler, session_handler};
use crate::middlewares::session_gate::{session_gate, SessionGateState};
use crate::service::auth_service::AuthService;

pub fn auth_router(service: Arc<dyn AuthService>, gate: Arc<SessionGateState>) -> Router {
    // Public login and refresh routes
    let public = Router::new()
        .route("/login", post(login_handler))
        .route("/auth/refresh", post(refresh_token_handler));

    let gated = Router::new()
        .route("/session", get(session_handler))
        .route("/logout", post(logout_handler))
        .route_layer(middleware::from_fn_with_state(gate, session_gate));

    public.merge(gated).with_state(service)
}
