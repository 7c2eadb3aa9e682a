mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use admin_panel_backend::dto::quote_dto::{QuoteFilter, QuoteQuery, MAX_PAGE};
use admin_panel_backend::model::quote::{NewQuote, Quote};
use admin_panel_backend::model::quote_status::{QuoteStatus, StatusValue};
use admin_panel_backend::repository::quote_repo::{InMemoryQuoteRepository, QuoteRepository};
use admin_panel_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use admin_panel_backend::service::quote_service::{QuoteService, QuoteServiceImpl};
use admin_panel_backend::util::error::ServiceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{at, quote, quotes};

/// Delegates to the in-memory store, failing writes on demand.
struct FlakyQuoteRepository {
    inner: InMemoryQuoteRepository,
    fail_writes: AtomicBool,
}

impl FlakyQuoteRepository {
    fn new(quotes: Vec<Quote>) -> Self {
        FlakyQuoteRepository { inner: InMemoryQuoteRepository::with_quotes(quotes), fail_writes: AtomicBool::new(false) }
    }

    fn check(&self) -> RepositoryResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::ConnectionError("store unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl QuoteRepository for FlakyQuoteRepository {
    async fn find_page(&self, query: &QuoteQuery) -> RepositoryResult<(Vec<Quote>, u64)> {
        self.inner.find_page(query).await
    }
    async fn find_all(&self, filter: &QuoteFilter) -> RepositoryResult<Vec<Quote>> {
        self.inner.find_all(filter).await
    }
    async fn get_by_id(&self, id: &str) -> RepositoryResult<Quote> {
        self.inner.get_by_id(id).await
    }
    async fn update_status(&self, id: &str, status: QuoteStatus, updated_at: DateTime<Utc>) -> RepositoryResult<()> {
        self.check()?;
        self.inner.update_status(id, status, updated_at).await
    }
    async fn delete_returning(&self, id: &str) -> RepositoryResult<Quote> {
        self.check()?;
        self.inner.delete_returning(id).await
    }
    async fn list_statuses(&self) -> RepositoryResult<Vec<StatusValue>> {
        self.inner.list_statuses().await
    }
    async fn find_created_since(&self, since: DateTime<Utc>) -> RepositoryResult<Vec<Quote>> {
        self.inner.find_created_since(since).await
    }
    async fn find_excluding_status(&self, status: QuoteStatus) -> RepositoryResult<Vec<Quote>> {
        self.inner.find_excluding_status(status).await
    }
    async fn insert(&self, quote: NewQuote) -> RepositoryResult<Quote> {
        self.inner.insert(quote).await
    }
}

fn service_with(quotes: Vec<Quote>) -> (Arc<FlakyQuoteRepository>, QuoteServiceImpl) {
    let repo = Arc::new(FlakyQuoteRepository::new(quotes));
    let service = QuoteServiceImpl::new(repo.clone());
    (repo, service)
}

#[tokio::test]
async fn test_counts_sum_to_total_and_bucket_unknown_values() {
    let mut rows = quotes(12, &[QuoteStatus::Pending, QuoteStatus::Approved, QuoteStatus::Completed]);
    rows[0].status = StatusValue::Unrecognized("archived".to_string());
    let (_, service) = service_with(rows);

    let counts = service.status_counts().await.unwrap();
    assert_eq!(counts.total(), 12);
    assert_eq!(counts.unknown(), 1);
    assert_eq!(counts.get(QuoteStatus::Pending), 3);
    assert_eq!(counts.get(QuoteStatus::Approved), 4);
    assert_eq!(counts.get(QuoteStatus::Cancelled), 0);
    let known: u64 = counts.iter().map(|(_, n)| n).sum();
    assert_eq!(known + counts.unknown(), counts.total());
}

#[tokio::test]
async fn test_counts_ignore_list_filters() {
    let (_, service) = service_with(quotes(5, &[QuoteStatus::Pending, QuoteStatus::OnHold]));
    let filtered = QuoteQuery {
        page: 1,
        filter: QuoteFilter { search: Some("nobody".to_string()), ..QuoteFilter::default() },
    };
    assert_eq!(service.list_quotes(filtered).await.unwrap().total, 0);
    assert_eq!(service.status_counts().await.unwrap().total(), 5);
}

#[tokio::test]
async fn test_deleting_approved_quote_decrements_approved() {
    let (_, service) = service_with(vec![
        quote("a", QuoteStatus::Approved, at(2025, 1, 1, 9, 0)),
        quote("b", QuoteStatus::Approved, at(2025, 1, 1, 10, 0)),
        quote("c", QuoteStatus::Pending, at(2025, 1, 1, 11, 0)),
    ]);
    let before = service.status_counts().await.unwrap();

    let deleted = service.delete_quote("a").await.unwrap();
    assert_eq!(deleted.id, "a");
    assert_eq!(deleted.status, StatusValue::Known(QuoteStatus::Approved));

    let after = service.status_counts().await.unwrap();
    assert_eq!(after.get(QuoteStatus::Approved), before.get(QuoteStatus::Approved) - 1);
    assert_eq!(after.get(QuoteStatus::Pending), before.get(QuoteStatus::Pending));
    assert!(matches!(service.get_quote("a").await, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_list_page_carries_derived_totals() {
    let (_, service) = service_with(quotes(11, &[QuoteStatus::Pending]));
    let page = service.list_quotes(QuoteQuery::first_page()).await.unwrap();
    assert_eq!(page.total, 11);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.quotes.len(), 10);
    assert!(page.quotes.iter().all(|view| view.total_amount == 100.0));

    let second = service.list_quotes(QuoteQuery { page: 2, ..QuoteQuery::first_page() }).await.unwrap();
    assert_eq!(second.quotes.len(), 1);
}

#[tokio::test]
async fn test_page_zero_is_rejected() {
    let (_, service) = service_with(Vec::new());
    let res = service.list_quotes(QuoteQuery { page: 0, ..QuoteQuery::first_page() }).await;
    assert!(matches!(res, Err(ServiceError::InvalidInput(_))));
}

#[tokio::test]
async fn test_page_past_last_skippable_is_rejected() {
    let (_, service) = service_with(quotes(3, &[QuoteStatus::Pending]));
    let res = service.list_quotes(QuoteQuery { page: u64::MAX, ..QuoteQuery::first_page() }).await;
    assert!(matches!(res, Err(ServiceError::InvalidInput(_))));

    let last = service.list_quotes(QuoteQuery { page: MAX_PAGE, ..QuoteQuery::first_page() }).await.unwrap();
    assert!(last.quotes.is_empty());
    assert_eq!(last.total, 3);
}

#[tokio::test]
async fn test_status_update_writes_fresh_timestamp() {
    let created = at(2025, 1, 1, 9, 0);
    let (_, service) = service_with(vec![quote("a", QuoteStatus::Pending, created)]);
    service.update_quote_status("a", QuoteStatus::InProgress).await.unwrap();
    let view = service.get_quote("a").await.unwrap();
    assert_eq!(view.quote.status, StatusValue::Known(QuoteStatus::InProgress));
    assert!(view.quote.updated_at > created);
    assert_eq!(view.quote.created_at, created);
}

#[tokio::test]
async fn test_store_failures_surface_without_partial_changes() {
    let (repo, service) = service_with(vec![quote("a", QuoteStatus::Pending, at(2025, 1, 1, 9, 0))]);
    repo.fail_writes.store(true, Ordering::SeqCst);

    let res = service.update_quote_status("a", QuoteStatus::Approved).await;
    assert!(matches!(res, Err(ServiceError::InternalError(_))));
    assert!(matches!(service.delete_quote("a").await, Err(ServiceError::InternalError(_))));

    let view = service.get_quote("a").await.unwrap();
    assert_eq!(view.quote.status, StatusValue::Known(QuoteStatus::Pending));
}

#[tokio::test]
async fn test_missing_quote_is_not_found() {
    let (_, service) = service_with(Vec::new());
    assert!(matches!(
        service.update_quote_status("nope", QuoteStatus::Approved).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(service.delete_quote("nope").await, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_single_quote_export_is_named_after_the_quote() {
    let (_, service) = service_with(vec![quote("abc", QuoteStatus::Pending, at(2025, 1, 1, 9, 0))]);
    let file = service.export_quote("abc").await.unwrap();
    let today = Utc::now().format("%Y-%m-%d").to_string();
    assert_eq!(file.file_name, format!("Quote_abc_{}.zip", today));
    assert_eq!(file.content_type, "application/zip");
    assert!(file.bytes.starts_with(b"PK"));
}
