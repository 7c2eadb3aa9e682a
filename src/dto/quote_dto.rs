use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

use crate::model::quote::{Quote, QuoteView};
use crate::model::quote_status::{QuoteStatus, StatusCounts, StatusValue, UnknownStatus};
use crate::model::timestamp::{end_of_day, start_of_day};

/// Rows per page of the quote list.
pub const PAGE_SIZE: u64 = 10;

/// Highest page whose offset still fits a signed 64-bit skip.
pub const MAX_PAGE: u64 = i64::MAX as u64 / PAGE_SIZE;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(QuoteStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: &StatusValue) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status.known() == Some(*wanted),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

/// The filter half of a quote query: status, free-text search and creation-date range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteFilter {
    pub status: StatusFilter,
    pub search: Option<String>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

impl QuoteFilter {
    /// The search term with surrounding whitespace removed, if anything is left.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Inclusive creation bounds: start of `date_start` through end of `date_end`.
    pub fn created_bounds(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        (self.date_start.map(start_of_day), self.date_end.map(end_of_day))
    }

    pub fn matches(&self, quote: &Quote) -> bool {
        if !self.status.matches(&quote.status) {
            return false;
        }
        let (from, to) = self.created_bounds();
        if from.is_some_and(|from| quote.created_at < from) {
            return false;
        }
        if to.is_some_and(|to| quote.created_at > to) {
            return false;
        }
        match self.search_term() {
            None => true,
            Some(term) => {
                let needle = term.to_lowercase();
                [
                    &quote.customer_first_name,
                    &quote.customer_last_name,
                    &quote.customer_email,
                    &quote.customer_phone,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }
}

/// One page request against the quote store. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteQuery {
    pub page: u64,
    pub filter: QuoteFilter,
}

impl QuoteQuery {
    pub fn first_page() -> Self {
        QuoteQuery { page: 1, filter: QuoteFilter::default() }
    }

    /// Rows to skip before the requested window.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(PAGE_SIZE)
    }
}

impl Default for QuoteQuery {
    fn default() -> Self {
        Self::first_page()
    }
}

/// Query string of `GET /quotes` and `GET /quotes/export`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListQuotesParams {
    #[validate(range(min = 1))]
    pub page: Option<u64>,
    pub status: Option<String>,
    #[validate(length(max = 200))]
    pub search: Option<String>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryParamsError {
    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),
    #[error("date_start must not be after date_end")]
    InvertedDateRange,
    #[error("page must be between 1 and {}", MAX_PAGE)]
    PageOutOfRange,
}

impl ListQuotesParams {
    pub fn into_query(self) -> Result<QuoteQuery, QueryParamsError> {
        let status = match self.status.as_deref() {
            Some(raw) => raw.parse::<StatusFilter>()?,
            None => StatusFilter::All,
        };
        if let (Some(start), Some(end)) = (self.date_start, self.date_end) {
            if start > end {
                return Err(QueryParamsError::InvertedDateRange);
            }
        }
        let page = self.page.unwrap_or(1);
        if !(1..=MAX_PAGE).contains(&page) {
            return Err(QueryParamsError::PageOutOfRange);
        }
        Ok(QuoteQuery {
            page,
            filter: QuoteFilter {
                status,
                search: self.search,
                date_start: self.date_start,
                date_end: self.date_end,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotePage {
    pub quotes: Vec<QuoteView>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl QuotePage {
    pub fn new(quotes: Vec<QuoteView>, total: u64, page: u64) -> Self {
        QuotePage {
            quotes,
            total,
            page,
            page_size: PAGE_SIZE,
            total_pages: total.div_ceil(PAGE_SIZE),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateQuoteStatusRequest {
    #[validate(length(min = 1, max = 50))]
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuoteParams {
    #[serde(default)]
    pub confirm: bool,
}

/// `counts` is absent when the delete went through but the follow-up count read did not.
#[derive(Debug, Serialize)]
pub struct DeleteQuoteResponse {
    pub deleted: QuoteView,
    pub counts: Option<StatusCounts>,
}

/// `quote` is absent when the write went through but re-reading the quote did not.
#[derive(Debug, Serialize)]
pub struct UpdateQuoteStatusResponse {
    pub id: String,
    pub status: QuoteStatus,
    pub quote: Option<QuoteView>,
}
