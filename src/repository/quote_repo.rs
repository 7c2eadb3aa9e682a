use async_trait::async_trait;
use bson::{doc, Bson, Document};
use chrono::{DateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::mongo_conf::MongoConfig;
use crate::dto::quote_dto::{QuoteFilter, QuoteQuery, StatusFilter, PAGE_SIZE};
use crate::model::quote::{NewQuote, Quote};
use crate::model::quote_status::{QuoteStatus, StatusValue};
use crate::model::timestamp::format_timestamp;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Fields matched by the free-text search.
const SEARCH_FIELDS: [&str; 4] = [
    "customer_first_name",
    "customer_last_name",
    "customer_email",
    "customer_phone",
];

const CASE_ID_COUNTER: &str = "quote_case_id";

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// One window of `PAGE_SIZE` rows, newest first, plus the count of all matching rows.
    async fn find_page(&self, query: &QuoteQuery) -> RepositoryResult<(Vec<Quote>, u64)>;
    /// Every matching row, newest first.
    async fn find_all(&self, filter: &QuoteFilter) -> RepositoryResult<Vec<Quote>>;
    async fn get_by_id(&self, id: &str) -> RepositoryResult<Quote>;
    async fn update_status(&self, id: &str, status: QuoteStatus, updated_at: DateTime<Utc>) -> RepositoryResult<()>;
    /// Removes the row and hands it back.
    async fn delete_returning(&self, id: &str) -> RepositoryResult<Quote>;
    /// The status column of the whole table.
    async fn list_statuses(&self) -> RepositoryResult<Vec<StatusValue>>;
    /// Rows created at or after `since`, oldest first.
    async fn find_created_since(&self, since: DateTime<Utc>) -> RepositoryResult<Vec<Quote>>;
    async fn find_excluding_status(&self, status: QuoteStatus) -> RepositoryResult<Vec<Quote>>;
    async fn insert(&self, quote: NewQuote) -> RepositoryResult<Quote>;
}

pub struct MongoQuoteRepository {
    collection: Collection<Quote>,
    counters: Collection<Document>,
}

#[derive(Debug, Deserialize)]
struct StatusRow {
    #[serde(default)]
    status: Option<StatusValue>,
}

/// Escapes regex metacharacters so the search term matches literally.
pub fn escape_regex(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if "\\.^$|?*+()[]{}-/".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Translates a filter into a MongoDB query document.
pub fn filter_document(filter: &QuoteFilter) -> Document {
    let mut query = Document::new();

    if let StatusFilter::Only(status) = filter.status {
        query.insert("status", status.as_str());
    }

    let (from, to) = filter.created_bounds();
    let mut range = Document::new();
    if let Some(from) = from {
        range.insert("$gte", format_timestamp(&from));
    }
    if let Some(to) = to {
        range.insert("$lte", format_timestamp(&to));
    }
    if !range.is_empty() {
        query.insert("created_at", range);
    }

    if let Some(term) = filter.search_term() {
        let pattern = escape_regex(term);
        let clauses: Vec<Bson> = SEARCH_FIELDS
            .iter()
            .map(|field| {
                let mut clause = Document::new();
                clause.insert(*field, doc! { "$regex": pattern.as_str(), "$options": "i" });
                Bson::Document(clause)
            })
            .collect();
        query.insert("$or", clauses);
    }

    query
}

impl MongoQuoteRepository {
    pub fn new(db: &Database, config: &MongoConfig) -> Self {
        MongoQuoteRepository {
            collection: db.collection::<Quote>(&config.quote_collection),
            counters: db.collection::<Document>("counters"),
        }
    }

    /// Indexes backing the list ordering and the status filter.
    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        let indexes = vec![
            IndexModel::builder().keys(doc! { "created_at": -1 }).build(),
            IndexModel::builder().keys(doc! { "status": 1 }).build(),
            IndexModel::builder()
                .keys(doc! { "case_id": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        ];
        self.collection.create_indexes(indexes, None).await?;
        info!("Quote indexes ensured");
        Ok(())
    }

    async fn next_case_id(&self) -> RepositoryResult<i64> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        let counter = self
            .counters
            .find_one_and_update(doc! { "_id": CASE_ID_COUNTER }, doc! { "$inc": { "seq": 1_i64 } }, options)
            .await?
            .ok_or_else(|| RepositoryError::database("Case id counter was not created"))?;
        counter
            .get_i64("seq")
            .map_err(|e| RepositoryError::serialization(format!("Invalid case id counter: {}", e)))
    }

    async fn collect(&self, filter: Document, options: FindOptions) -> RepositoryResult<Vec<Quote>> {
        let cursor = self.collection.find(filter, options).await?;
        cursor.try_collect().await.map_err(|e| {
            error!("Failed to read quotes from cursor: {}", e);
            RepositoryError::serialization(format!("Failed to deserialize quote: {}", e))
        })
    }
}

#[async_trait]
impl QuoteRepository for MongoQuoteRepository {
    #[tracing::instrument(skip(self), fields(page = query.page))]
    async fn find_page(&self, query: &QuoteQuery) -> RepositoryResult<(Vec<Quote>, u64)> {
        let filter = filter_document(&query.filter);
        debug!(filter = %filter, "Querying quote page");

        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(query.offset())
            .limit(PAGE_SIZE as i64)
            .build();
        let quotes = self.collect(filter.clone(), options).await?;

        let total = match self.collection.count_documents(filter, None).await {
            Ok(total) => total,
            Err(e) => {
                error!("Failed to count quotes: {}", e);
                return Err(RepositoryError::database(format!("Failed to count quotes: {}", e)));
            }
        };

        info!("Fetched {} quotes of {} matching", quotes.len(), total);
        Ok((quotes, total))
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self, filter: &QuoteFilter) -> RepositoryResult<Vec<Quote>> {
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let quotes = self.collect(filter_document(filter), options).await?;
        info!("Fetched {} quotes for export", quotes.len());
        Ok(quotes)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: &str) -> RepositoryResult<Quote> {
        match self.collection.find_one(doc! { "_id": id }, None).await {
            Ok(Some(quote)) => Ok(quote),
            Ok(None) => {
                warn!("Quote not found for ID: {}", id);
                Err(RepositoryError::not_found(format!("Quote not found for ID: {}", id)))
            }
            Err(e) => {
                error!("Failed to fetch quote by ID: {}", e);
                Err(RepositoryError::database(format!("Failed to fetch quote by ID: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id, status = %status))]
    async fn update_status(&self, id: &str, status: QuoteStatus, updated_at: DateTime<Utc>) -> RepositoryResult<()> {
        let update = doc! {
            "$set": { "status": status.as_str(), "updated_at": format_timestamp(&updated_at) }
        };
        match self.collection.update_one(doc! { "_id": id }, update, None).await {
            Ok(result) if result.matched_count > 0 => {
                info!("Quote status updated for ID: {}", id);
                Ok(())
            }
            Ok(_) => {
                warn!("No quote found to update status for ID: {}", id);
                Err(RepositoryError::not_found(format!("No quote found to update status for ID: {}", id)))
            }
            Err(e) => {
                error!("Failed to update quote status: {}", e);
                Err(RepositoryError::database(format!("Failed to update quote status: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete_returning(&self, id: &str) -> RepositoryResult<Quote> {
        match self.collection.find_one_and_delete(doc! { "_id": id }, None).await {
            Ok(Some(quote)) => {
                info!("Quote deleted for ID: {}", id);
                Ok(quote)
            }
            Ok(None) => {
                warn!("No quote found to delete for ID: {}", id);
                Err(RepositoryError::not_found(format!("No quote found to delete for ID: {}", id)))
            }
            Err(e) => {
                error!("Failed to delete quote: {}", e);
                Err(RepositoryError::database(format!("Failed to delete quote: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn list_statuses(&self) -> RepositoryResult<Vec<StatusValue>> {
        let options = FindOptions::builder().projection(doc! { "status": 1, "_id": 0 }).build();
        let cursor = self.collection.clone_with_type::<StatusRow>().find(None, options).await?;
        let rows: Vec<StatusRow> = cursor.try_collect().await?;
        debug!("Read {} status values", rows.len());
        Ok(rows
            .into_iter()
            .map(|row| row.status.unwrap_or_else(|| StatusValue::Unrecognized(String::new())))
            .collect())
    }

    #[tracing::instrument(skip(self), fields(since = %since))]
    async fn find_created_since(&self, since: DateTime<Utc>) -> RepositoryResult<Vec<Quote>> {
        let options = FindOptions::builder().sort(doc! { "created_at": 1 }).build();
        self.collect(doc! { "created_at": { "$gte": format_timestamp(&since) } }, options)
            .await
    }

    #[tracing::instrument(skip(self), fields(status = %status))]
    async fn find_excluding_status(&self, status: QuoteStatus) -> RepositoryResult<Vec<Quote>> {
        self.collect(doc! { "status": { "$ne": status.as_str() } }, FindOptions::default())
            .await
    }

    #[tracing::instrument(skip(self, quote), fields(email = %quote.customer_email))]
    async fn insert(&self, quote: NewQuote) -> RepositoryResult<Quote> {
        let case_id = self.next_case_id().await?;
        let quote = quote.into_quote(Uuid::new_v4().to_string(), case_id, Utc::now());
        match self.collection.insert_one(&quote, None).await {
            Ok(_) => {
                info!(case_id, "Quote recorded");
                Ok(quote)
            }
            Err(e) => {
                error!("Failed to insert quote: {}", e);
                Err(e.into())
            }
        }
    }
}

/// Process-local quote store with the same observable behaviour as the MongoDB one.
#[derive(Default)]
pub struct InMemoryQuoteRepository {
    inner: RwLock<InMemoryQuotes>,
}

#[derive(Default)]
struct InMemoryQuotes {
    quotes: Vec<Quote>,
    last_case_id: i64,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with pre-built rows (ids and case ids are kept as given).
    pub fn with_quotes(quotes: Vec<Quote>) -> Self {
        let last_case_id = quotes.iter().map(|q| q.case_id).max().unwrap_or(0);
        InMemoryQuoteRepository {
            inner: RwLock::new(InMemoryQuotes { quotes, last_case_id }),
        }
    }
}

fn newest_first(mut quotes: Vec<Quote>) -> Vec<Quote> {
    quotes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    quotes
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn find_page(&self, query: &QuoteQuery) -> RepositoryResult<(Vec<Quote>, u64)> {
        let matching = self.find_all(&query.filter).await?;
        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(PAGE_SIZE as usize)
            .collect();
        Ok((page, total))
    }

    async fn find_all(&self, filter: &QuoteFilter) -> RepositoryResult<Vec<Quote>> {
        let inner = self.inner.read().await;
        let matching = inner.quotes.iter().filter(|q| filter.matches(q)).cloned().collect();
        Ok(newest_first(matching))
    }

    async fn get_by_id(&self, id: &str) -> RepositoryResult<Quote> {
        let inner = self.inner.read().await;
        inner
            .quotes
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Quote not found for ID: {}", id)))
    }

    async fn update_status(&self, id: &str, status: QuoteStatus, updated_at: DateTime<Utc>) -> RepositoryResult<()> {
        let mut inner = self.inner.write().await;
        let quote = inner
            .quotes
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| RepositoryError::not_found(format!("No quote found to update status for ID: {}", id)))?;
        quote.status = StatusValue::Known(status);
        quote.updated_at = updated_at;
        Ok(())
    }

    async fn delete_returning(&self, id: &str) -> RepositoryResult<Quote> {
        let mut inner = self.inner.write().await;
        let position = inner
            .quotes
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| RepositoryError::not_found(format!("No quote found to delete for ID: {}", id)))?;
        Ok(inner.quotes.remove(position))
    }

    async fn list_statuses(&self) -> RepositoryResult<Vec<StatusValue>> {
        let inner = self.inner.read().await;
        Ok(inner.quotes.iter().map(|q| q.status.clone()).collect())
    }

    async fn find_created_since(&self, since: DateTime<Utc>) -> RepositoryResult<Vec<Quote>> {
        let inner = self.inner.read().await;
        let mut quotes: Vec<Quote> = inner.quotes.iter().filter(|q| q.created_at >= since).cloned().collect();
        quotes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(quotes)
    }

    async fn find_excluding_status(&self, status: QuoteStatus) -> RepositoryResult<Vec<Quote>> {
        let inner = self.inner.read().await;
        Ok(inner
            .quotes
            .iter()
            .filter(|q| q.status.known() != Some(status))
            .cloned()
            .collect())
    }

    async fn insert(&self, quote: NewQuote) -> RepositoryResult<Quote> {
        let mut inner = self.inner.write().await;
        inner.last_case_id += 1;
        let quote = quote.into_quote(Uuid::new_v4().to_string(), inner.last_case_id, Utc::now());
        inner.quotes.push(quote.clone());
        Ok(quote)
    }
}
