use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use tracing::{info, warn};
use validator::Validate;

use crate::dto::quote_dto::{
    DeleteQuoteParams, DeleteQuoteResponse, ListQuotesParams, QuoteQuery, UpdateQuoteStatusRequest,
    UpdateQuoteStatusResponse,
};
use crate::handler::attachment;
use crate::model::quote::QuoteView;
use crate::model::quote_status::QuoteStatus;
use crate::service::quote_service::QuoteService;
use crate::util::error::HandlerError;

fn parse_query(params: ListQuotesParams) -> Result<QuoteQuery, HandlerError> {
    params.validate().map_err(HandlerError::validation)?;
    params.into_query().map_err(|e| HandlerError::bad_request(e.to_string()))
}

// GET /quotes
pub async fn list_quotes_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Query(params): Query<ListQuotesParams>,
) -> Result<impl IntoResponse, HandlerError> {
    let query = parse_query(params)?;
    let page = service.list_quotes(query).await?;
    Ok(Json(page))
}

// GET /quotes/stats
pub async fn quote_stats_handler(
    State(service): State<Arc<dyn QuoteService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.status_counts().await?))
}

// GET /quotes/{id}
pub async fn get_quote_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.get_quote(&id).await?))
}

// PUT /quotes/{id}/status
pub async fn update_quote_status_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuoteStatusRequest>,
) -> Result<Json<UpdateQuoteStatusResponse>, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let status: QuoteStatus = payload
        .status
        .parse()
        .map_err(|e: crate::model::quote_status::UnknownStatus| HandlerError::bad_request(e.to_string()))?;
    service.update_quote_status(&id, status).await?;
    info!(id = %id, status = %status, "Quote status changed");
    let quote = service
        .get_quote(&id)
        .await
        .inspect_err(|e| warn!(id = %id, "Status saved but re-reading the quote failed: {e}"))
        .ok();
    Ok(Json(UpdateQuoteStatusResponse { id, status, quote }))
}

// DELETE /quotes/{id}?confirm=true
pub async fn delete_quote_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Path(id): Path<String>,
    Query(params): Query<DeleteQuoteParams>,
) -> Result<impl IntoResponse, HandlerError> {
    if !params.confirm {
        warn!(id = %id, "Unconfirmed delete rejected");
        return Err(HandlerError::bad_request("Deleting a quote must be confirmed with confirm=true"));
    }
    let deleted = service.delete_quote(&id).await?;
    let counts = service
        .status_counts()
        .await
        .inspect_err(|e| warn!(id = %id, "Quote deleted but the count refresh failed: {e}"))
        .ok();
    Ok(Json(DeleteQuoteResponse { deleted: QuoteView::from(deleted), counts }))
}

// GET /quotes/{id}/export
pub async fn export_quote_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let file = service.export_quote(&id).await?;
    Ok(attachment(file))
}

// GET /quotes/export
pub async fn export_quotes_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Query(params): Query<ListQuotesParams>,
) -> Result<impl IntoResponse, HandlerError> {
    let query = parse_query(params)?;
    let file = service.export_quotes(query).await?;
    Ok(attachment(file))
}
