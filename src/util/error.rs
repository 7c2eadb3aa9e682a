use axum::{response::{IntoResponse, Response}, http::StatusCode};
use serde::Serialize;

use crate::repository::repository_error::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HandlerErrorKind {
    NotFound,
    Validation,
    Internal,
    Unauthorized,
    Forbidden,
    Conflict,
    BadRequest,
}

impl std::fmt::Display for HandlerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HandlerErrorKind::NotFound => "NotFound",
            HandlerErrorKind::Validation => "Validation",
            HandlerErrorKind::Internal => "Internal",
            HandlerErrorKind::Unauthorized => "Unauthorized",
            HandlerErrorKind::Forbidden => "Forbidden",
            HandlerErrorKind::Conflict => "Conflict",
            HandlerErrorKind::BadRequest => "BadRequest",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Serialize)]
pub struct HandlerError {
    pub error: HandlerErrorKind,
    pub message: String,
    pub details: Option<String>,
}

impl HandlerError {
    pub fn new(error: HandlerErrorKind, message: impl Into<String>) -> Self {
        HandlerError { error, message: message.into(), details: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::BadRequest, message)
    }

    pub fn validation(errors: validator::ValidationErrors) -> Self {
        HandlerError {
            error: HandlerErrorKind::Validation,
            message: "Validation error".to_string(),
            details: Some(errors.to_string()),
        }
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for HandlerError {}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = match self.error {
            HandlerErrorKind::NotFound => StatusCode::NOT_FOUND,
            HandlerErrorKind::Validation | HandlerErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            HandlerErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            HandlerErrorKind::Forbidden => StatusCode::FORBIDDEN,
            HandlerErrorKind::Conflict => StatusCode::CONFLICT,
            HandlerErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = axum::Json(self);
        (status, body).into_response()
    }
}

impl From<ServiceError> for HandlerError {
    fn from(err: ServiceError) -> Self {
        let (kind, message) = match err {
            ServiceError::NotFound(msg) => (HandlerErrorKind::NotFound, msg),
            ServiceError::InvalidInput(msg) => (HandlerErrorKind::BadRequest, msg),
            ServiceError::Conflict(msg) => (HandlerErrorKind::Conflict, msg),
            ServiceError::Unauthorized(msg) => (HandlerErrorKind::Unauthorized, msg),
            ServiceError::InternalError(msg) => {
                tracing::error!("Internal error reached the handler: {}", msg);
                (HandlerErrorKind::Internal, "Internal server error".to_string())
            }
        };
        HandlerError::new(kind, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    NotFound(String),
    InvalidInput(String),
    InternalError(String),
    Conflict(String),
    Unauthorized(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ServiceError::InvalidInput(msg) => write!(f, "Invalid Input: {}", msg),
            ServiceError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
            ServiceError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ServiceError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
            RepositoryError::ValidationError(msg) => ServiceError::InvalidInput(msg),
            RepositoryError::AlreadyExists(msg) => ServiceError::Conflict(msg),
            RepositoryError::DatabaseError(msg) => ServiceError::InternalError(msg),
            RepositoryError::ConnectionError(msg) => ServiceError::InternalError(msg),
            RepositoryError::SerializationError(msg) => ServiceError::InternalError(msg),
            RepositoryError::Generic(e) => ServiceError::InternalError(e.to_string()),
        }
    }
}
