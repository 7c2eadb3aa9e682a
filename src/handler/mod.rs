pub mod auth_handler;
pub mod catalog_handler;
pub mod dashboard_handler;
pub mod product_handler;
pub mod quote_handler;
pub mod supplier_handler;

use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::export::ExportFile;
use crate::util::error::{HandlerError, HandlerErrorKind};

/// Sends an export as a file download.
pub(crate) fn attachment(file: ExportFile) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    (
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response()
}

/// Signed-in requests for paths nothing serves.
pub async fn not_found_handler() -> HandlerError {
    HandlerError::new(HandlerErrorKind::NotFound, "No such page")
}
