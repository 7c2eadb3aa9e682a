use std::sync::Arc;

use axum::extract::{Extension, Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LogoutRequest, RefreshTokenRequest};
use crate::service::auth_service::{AuthService, Session};
use crate::util::error::HandlerError;

// Login
pub async fn login_handler(
    State(service): State<Arc<dyn AuthService>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let res = service.sign_in(&payload.email, &payload.password).await?;
    Ok(Json(res))
}

// Refresh Token
pub async fn refresh_token_handler(
    State(service): State<Arc<dyn AuthService>>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let tokens = service.refresh(&payload.refresh_token).await?;
    Ok(Json(tokens))
}

pub async fn session_handler(Extension(session): Extension<Session>) -> impl IntoResponse {
    Json(session)
}

pub async fn logout_handler(
    State(service): State<Arc<dyn AuthService>>,
    Extension(session): Extension<Session>,
    Json(payload): Json<LogoutRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    service.sign_out(&session, payload.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}
