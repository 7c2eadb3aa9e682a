use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::dto::quote_dto::{QuotePage, QuoteQuery, MAX_PAGE};
use crate::export::{self, ExportFile};
use crate::model::quote::{Quote, QuoteView};
use crate::model::quote_status::{QuoteStatus, StatusCounts};
use crate::repository::quote_repo::QuoteRepository;
use crate::util::error::ServiceError;

#[async_trait]
pub trait QuoteService: Send + Sync {
    async fn list_quotes(&self, query: QuoteQuery) -> Result<QuotePage, ServiceError>;
    async fn get_quote(&self, id: &str) -> Result<QuoteView, ServiceError>;
    /// Writes the new status together with a fresh `updated_at`.
    async fn update_quote_status(&self, id: &str, status: QuoteStatus) -> Result<(), ServiceError>;
    /// Removes the quote and hands back the row as it was.
    async fn delete_quote(&self, id: &str) -> Result<Quote, ServiceError>;
    /// Buckets over every stored quote, regardless of any list filter.
    async fn status_counts(&self) -> Result<StatusCounts, ServiceError>;
    async fn export_quote(&self, id: &str) -> Result<ExportFile, ServiceError>;
    async fn export_quotes(&self, query: QuoteQuery) -> Result<ExportFile, ServiceError>;
}

pub struct QuoteServiceImpl {
    pub quote_repo: Arc<dyn QuoteRepository>,
}

impl QuoteServiceImpl {
    pub fn new(quote_repo: Arc<dyn QuoteRepository>) -> Self {
        QuoteServiceImpl { quote_repo }
    }
}

fn export_failed(e: export::archive::ExportError) -> ServiceError {
    error!("Failed to build export archive: {e}");
    ServiceError::InternalError(format!("Export failed: {e}"))
}

#[async_trait]
impl QuoteService for QuoteServiceImpl {
    #[instrument(skip(self, query), fields(page = query.page, status = ?query.filter.status))]
    async fn list_quotes(&self, query: QuoteQuery) -> Result<QuotePage, ServiceError> {
        if query.page == 0 {
            warn!("Rejected quote page 0");
            return Err(ServiceError::InvalidInput("Page numbers start at 1".to_string()));
        }
        if query.page > MAX_PAGE {
            warn!("Rejected quote page past {MAX_PAGE}");
            return Err(ServiceError::InvalidInput(format!("Page numbers end at {MAX_PAGE}")));
        }
        info!("Listing quotes");
        let res = self.quote_repo.find_page(&query).await;
        match &res {
            Ok((rows, total)) => info!("Fetched {} of {} quotes", rows.len(), total),
            Err(e) => error!("Failed to fetch quotes: {e}"),
        }
        let (rows, total) = res?;
        let views = rows.into_iter().map(QuoteView::from).collect();
        Ok(QuotePage::new(views, total, query.page))
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_quote(&self, id: &str) -> Result<QuoteView, ServiceError> {
        info!("Getting quote by id");
        let quote = self.quote_repo.get_by_id(id).await.map_err(ServiceError::from)?;
        Ok(QuoteView::from(quote))
    }

    #[instrument(skip(self), fields(id = %id, status = %status))]
    async fn update_quote_status(&self, id: &str, status: QuoteStatus) -> Result<(), ServiceError> {
        info!("Updating quote status");
        let res = self.quote_repo.update_status(id, status, Utc::now()).await;
        match &res {
            Ok(_) => info!("Quote status updated"),
            Err(e) => error!("Failed to update quote status: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_quote(&self, id: &str) -> Result<Quote, ServiceError> {
        info!("Deleting quote");
        let res = self.quote_repo.delete_returning(id).await;
        match &res {
            Ok(deleted) => info!(status = %deleted.status, "Quote deleted"),
            Err(e) => error!("Failed to delete quote: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self))]
    async fn status_counts(&self) -> Result<StatusCounts, ServiceError> {
        let statuses = self.quote_repo.list_statuses().await.map_err(|e| {
            error!("Failed to load quote statuses: {e}");
            ServiceError::from(e)
        })?;
        let counts = StatusCounts::from_statuses(&statuses);
        if counts.unknown() > 0 {
            warn!("{} quotes carry an unrecognized status", counts.unknown());
        }
        Ok(counts)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn export_quote(&self, id: &str) -> Result<ExportFile, ServiceError> {
        let quote = self.quote_repo.get_by_id(id).await.map_err(ServiceError::from)?;
        let file = export::export_quote(&quote, Utc::now()).map_err(export_failed)?;
        info!(file = %file.file_name, "Quote exported");
        Ok(file)
    }

    #[instrument(skip(self, query), fields(status = ?query.filter.status))]
    async fn export_quotes(&self, query: QuoteQuery) -> Result<ExportFile, ServiceError> {
        let quotes = self.quote_repo.find_all(&query.filter).await.map_err(ServiceError::from)?;
        let file = export::export_quotes(&quotes, Utc::now()).map_err(export_failed)?;
        info!(file = %file.file_name, rows = quotes.len(), "Quote list exported");
        Ok(file)
    }
}
