use chrono::NaiveDate;

use crate::dto::quote_dto::{QuoteFilter, QuotePage, QuoteQuery, StatusFilter};
use crate::model::quote::QuoteView;
use crate::model::quote_status::{QuoteStatus, StatusCounts, StatusValue};
use crate::util::error::ServiceError;

pub const FETCH_FAILED: &str = "Failed to fetch quotes";
pub const STATUS_UPDATED: &str = "Quote status updated";
pub const STATUS_UPDATE_FAILED: &str = "Error updating quote status";
pub const QUOTE_DELETED: &str = "Quote deleted successfully";
pub const QUOTE_DELETE_FAILED: &str = "Error deleting quote";
pub const NO_ACTIVE_SESSION: &str = "No active session. Please login again.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("quote {0} is not on the board")]
    RowNotFound(String),
    #[error("quote {0} already has an operation in flight")]
    RowBusy(String),
    #[error("no delete confirmation pending for quote {0}")]
    NotConfirmed(String),
    #[error("no active session")]
    NoSession,
    #[error("remote call failed: {0}")]
    Remote(ServiceError),
}

/// What the user asked to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardFilters {
    pub page: u64,
    pub status: StatusFilter,
    pub search: String,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

impl Default for BoardFilters {
    fn default() -> Self {
        BoardFilters {
            page: 1,
            status: StatusFilter::All,
            search: String::new(),
            date_start: None,
            date_end: None,
        }
    }
}

impl BoardFilters {
    pub fn to_query(&self) -> QuoteQuery {
        QuoteQuery {
            page: self.page.max(1),
            filter: QuoteFilter {
                status: self.status,
                search: Some(self.search.clone()).filter(|s| !s.trim().is_empty()),
                date_start: self.date_start,
                date_end: self.date_end,
            },
        }
    }

    /// Same filters, back on page 1.
    pub fn first_page(mut self) -> Self {
        self.page = 1;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Nothing shown yet; full-page indicator.
    Initial,
    /// Rows stay visible while a newer query runs.
    Searching,
    Idle,
}

/// Handed out by [`QuoteBoard::begin_fetch`]; only the newest ticket may land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    /// Last confirmed row write the board knew of when the read started.
    pub write_seq: u64,
    pub filters: BoardFilters,
}

impl FetchTicket {
    pub fn query(&self) -> QuoteQuery {
        self.filters.to_query()
    }
}

/// A status shown ahead of the store confirming it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingStatus {
    pub previous: StatusValue,
    pub target: QuoteStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardRow {
    pub quote: QuoteView,
    pub pending: Option<PendingStatus>,
    pub is_updating: bool,
    pub is_deleting: bool,
}

impl BoardRow {
    fn new(quote: QuoteView) -> Self {
        BoardRow { quote, pending: None, is_updating: false, is_deleting: false }
    }

    pub fn id(&self) -> &str {
        &self.quote.quote.id
    }

    pub fn status(&self) -> &StatusValue {
        &self.quote.quote.status
    }

    pub fn is_busy(&self) -> bool {
        self.is_updating || self.is_deleting
    }
}

/// A row change the store has acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowWrite {
    Status(StatusValue),
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedWrite {
    pub seq: u64,
    pub id: String,
    pub write: RowWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Issued when a delete is requested; must be handed back to carry it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub id: String,
    pub prior_status: StatusValue,
    /// The query to re-run once the row is gone.
    pub filters: BoardFilters,
}

#[derive(Debug, Clone)]
pub struct QuoteBoard {
    pub rows: Vec<BoardRow>,
    pub total: u64,
    pub counts: StatusCounts,
    pub filters: BoardFilters,
    pub phase: LoadPhase,
    pub generation: u64,
    pub counts_generation: u64,
    pub write_seq: u64,
    /// Confirmed writes that a page still in flight may not know about.
    pub confirmed_writes: Vec<ConfirmedWrite>,
    pub notices: Vec<Notice>,
    pub pending_delete: Option<DeleteConfirmation>,
}

impl Default for QuoteBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteBoard {
    pub fn new() -> Self {
        QuoteBoard {
            rows: Vec::new(),
            total: 0,
            counts: StatusCounts::new(),
            filters: BoardFilters::default(),
            phase: LoadPhase::Initial,
            generation: 0,
            counts_generation: 0,
            write_seq: 0,
            confirmed_writes: Vec::new(),
            notices: Vec::new(),
            pending_delete: None,
        }
    }

    pub fn row(&self, id: &str) -> Option<&BoardRow> {
        self.rows.iter().find(|row| row.id() == id)
    }

    fn row_mut(&mut self, id: &str) -> Option<&mut BoardRow> {
        self.rows.iter_mut().find(|row| row.id() == id)
    }

    fn idle_row_mut(&mut self, id: &str) -> Result<&mut BoardRow, BoardError> {
        let row = self.row_mut(id).ok_or_else(|| BoardError::RowNotFound(id.to_string()))?;
        if row.is_busy() {
            return Err(BoardError::RowBusy(id.to_string()));
        }
        Ok(row)
    }

    pub fn begin_fetch(&mut self, filters: BoardFilters) -> FetchTicket {
        self.generation += 1;
        if self.phase != LoadPhase::Initial {
            self.phase = LoadPhase::Searching;
        }
        self.filters = filters.clone();
        FetchTicket { generation: self.generation, write_seq: self.write_seq, filters }
    }

    fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Replaces the rows with `page`. Returns `false` and changes nothing for a stale ticket.
    ///
    /// Rows that are mid-update keep their tentative status and busy flags across the swap.
    /// Writes confirmed after the read started win over what the page says.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, page: QuotePage) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        let later: Vec<ConfirmedWrite> = self
            .confirmed_writes
            .iter()
            .filter(|write| write.seq > ticket.write_seq)
            .cloned()
            .collect();
        let latest = |id: &str| later.iter().rev().find(|write| write.id == id).map(|write| &write.write);

        let mut total = page.total;
        let previous = std::mem::take(&mut self.rows);
        self.rows = page
            .quotes
            .into_iter()
            .filter(|quote| {
                let removed = latest(&quote.quote.id) == Some(&RowWrite::Removed);
                if removed {
                    total = total.saturating_sub(1);
                }
                !removed
            })
            .map(|quote| {
                let mut row = BoardRow::new(quote);
                if let Some(RowWrite::Status(status)) = latest(row.id()) {
                    row.quote.quote.status = status.clone();
                }
                if let Some(old) = previous.iter().find(|old| old.id() == row.id()) {
                    if let Some(pending) = &old.pending {
                        row.quote.quote.status = StatusValue::Known(pending.target);
                        row.pending = Some(pending.clone());
                    }
                    row.is_updating = old.is_updating;
                    row.is_deleting = old.is_deleting;
                }
                row
            })
            .collect();
        self.total = total;
        self.phase = LoadPhase::Idle;
        self.confirmed_writes = later;
        true
    }

    fn record_write(&mut self, id: &str, write: RowWrite) {
        self.write_seq += 1;
        self.confirmed_writes.push(ConfirmedWrite { seq: self.write_seq, id: id.to_string(), write });
    }

    /// Keeps the rows as they were and raises an error notice, unless the ticket is stale.
    pub fn fail_fetch(&mut self, ticket: &FetchTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.phase = LoadPhase::Idle;
        self.push_notice(NoticeLevel::Error, FETCH_FAILED);
        true
    }

    /// Shows `target` on the row right away and marks it busy.
    pub fn apply_tentative_status(&mut self, id: &str, target: QuoteStatus) -> Result<PendingStatus, BoardError> {
        let row = self.idle_row_mut(id)?;
        let pending = PendingStatus { previous: row.status().clone(), target };
        row.quote.quote.status = StatusValue::Known(target);
        row.pending = Some(pending.clone());
        row.is_updating = true;
        Ok(pending)
    }

    /// The store accepted the tentative status.
    pub fn confirm_status(&mut self, id: &str) {
        let confirmed = self.row_mut(id).and_then(|row| {
            row.is_updating = false;
            row.pending.take().map(|pending| StatusValue::Known(pending.target))
        });
        if let Some(status) = confirmed {
            self.record_write(id, RowWrite::Status(status));
        }
    }

    /// Puts the previous status back if the row still shows the tentative one.
    pub fn discard_tentative_status(&mut self, id: &str) {
        if let Some(row) = self.row_mut(id) {
            if let Some(pending) = row.pending.take() {
                if row.quote.quote.status == StatusValue::Known(pending.target) {
                    row.quote.quote.status = pending.previous;
                }
            }
            row.is_updating = false;
        }
    }

    pub fn begin_counts(&mut self) -> u64 {
        self.counts_generation += 1;
        self.counts_generation
    }

    /// Applies a counts snapshot unless a newer read or a local adjustment came after it.
    pub fn set_counts(&mut self, generation: u64, counts: StatusCounts) -> bool {
        if generation != self.counts_generation {
            return false;
        }
        self.counts = counts;
        true
    }

    /// Local adjustment after a delete. Invalidates counts reads already in flight.
    pub fn decrement_count(&mut self, status: &StatusValue) {
        self.counts_generation += 1;
        self.counts.decrement(status);
    }

    pub fn request_delete(&mut self, id: &str) -> Result<DeleteConfirmation, BoardError> {
        let filters = self.filters.clone();
        let row = self.idle_row_mut(id)?;
        let confirmation = DeleteConfirmation {
            id: id.to_string(),
            prior_status: row.status().clone(),
            filters,
        };
        self.pending_delete = Some(confirmation.clone());
        Ok(confirmation)
    }

    /// Consumes the pending confirmation if it is the one presented.
    pub fn take_delete_confirmation(&mut self, confirmation: &DeleteConfirmation) -> Result<DeleteConfirmation, BoardError> {
        match self.pending_delete.take() {
            Some(pending) if pending.id == confirmation.id => Ok(pending),
            other => {
                self.pending_delete = other;
                Err(BoardError::NotConfirmed(confirmation.id.clone()))
            }
        }
    }

    pub fn cancel_delete(&mut self) -> Option<DeleteConfirmation> {
        self.pending_delete.take()
    }

    pub fn mark_deleting(&mut self, id: &str, deleting: bool) {
        if let Some(row) = self.row_mut(id) {
            row.is_deleting = deleting;
        }
    }

    /// Drops a row the store has deleted.
    pub fn remove_row(&mut self, id: &str) -> Option<BoardRow> {
        self.record_write(id, RowWrite::Removed);
        let index = self.rows.iter().position(|row| row.id() == id)?;
        self.total = self.total.saturating_sub(1);
        Some(self.rows.remove(index))
    }

    pub fn push_notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice { level, message: message.into() });
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
