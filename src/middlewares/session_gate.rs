use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::debug;

use crate::service::auth_service::AuthService;
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};

pub struct SessionGateState {
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub auth_service: Arc<dyn AuthService>,
    pub login_path: String,
}

/// Lets a request through only with a live admin session, which is then available to
/// handlers as an `Extension<Session>`. Everything else is sent to the login page.
pub async fn session_gate(
    State(state): State<Arc<SessionGateState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| state.jwt_utils.extract_token_from_header(h).ok());

    let session = match token {
        Some(token) => state.auth_service.current_session(&token).await,
        None => None,
    };

    match session {
        Some(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        None => {
            debug!(path = %req.uri().path(), "No session, redirecting to login");
            Redirect::to(&state.login_path).into_response()
        }
    }
}
