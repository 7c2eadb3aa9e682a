use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::board::state::{
    BoardError, BoardFilters, DeleteConfirmation, NoticeLevel, QuoteBoard, NO_ACTIVE_SESSION, QUOTE_DELETED,
    QUOTE_DELETE_FAILED, STATUS_UPDATED, STATUS_UPDATE_FAILED,
};
use crate::dto::quote_dto::StatusFilter;
use crate::model::quote_status::QuoteStatus;
use crate::service::auth_service::{AuthService, Session};
use crate::service::quote_service::QuoteService;

/// Where the board asks whether someone is still signed in.
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn active_session(&self) -> Option<Session>;
}

/// Resolves the access token currently held by the client through the auth service.
pub struct TokenSessionSource {
    auth: Arc<dyn AuthService>,
    token: RwLock<Option<String>>,
}

impl TokenSessionSource {
    pub fn new(auth: Arc<dyn AuthService>, token: Option<String>) -> Self {
        TokenSessionSource { auth, token: RwLock::new(token) }
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }
}

#[async_trait]
impl SessionSource for TokenSessionSource {
    async fn active_session(&self) -> Option<Session> {
        let token = self.token.read().await.clone()?;
        self.auth.current_session(&token).await
    }
}

#[derive(Clone)]
pub struct BoardController {
    service: Arc<dyn QuoteService>,
    sessions: Arc<dyn SessionSource>,
    board: Arc<Mutex<QuoteBoard>>,
}

impl BoardController {
    pub fn new(service: Arc<dyn QuoteService>, sessions: Arc<dyn SessionSource>) -> Self {
        BoardController { service, sessions, board: Arc::new(Mutex::new(QuoteBoard::new())) }
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> QuoteBoard {
        self.board.lock().await.clone()
    }

    /// First page, unfiltered, plus the counts.
    pub async fn mount(&self) {
        tokio::join!(self.fetch(BoardFilters::default()), self.refresh_counts());
    }

    /// Runs one list query. Returns whether its result reached the board.
    pub async fn fetch(&self, filters: BoardFilters) -> bool {
        let ticket = self.board.lock().await.begin_fetch(filters);
        debug!(generation = ticket.generation, page = ticket.filters.page, "Fetching quotes");
        let result = self.service.list_quotes(ticket.query()).await;

        let mut board = self.board.lock().await;
        let applied = match result {
            Ok(page) => board.complete_fetch(&ticket, page),
            Err(e) => {
                warn!("Quote fetch failed: {e}");
                board.fail_fetch(&ticket)
            }
        };
        if !applied {
            debug!(generation = ticket.generation, "Discarded stale quote page");
        }
        applied
    }

    async fn current_filters(&self) -> BoardFilters {
        self.board.lock().await.filters.clone()
    }

    pub async fn set_page(&self, page: u64) -> bool {
        let filters = BoardFilters { page: page.max(1), ..self.current_filters().await };
        self.fetch(filters).await
    }

    pub async fn set_status_filter(&self, status: StatusFilter) -> bool {
        let filters = BoardFilters { status, ..self.current_filters().await }.first_page();
        self.fetch(filters).await
    }

    pub async fn set_search(&self, search: impl Into<String>) -> bool {
        let filters = BoardFilters { search: search.into(), ..self.current_filters().await }.first_page();
        self.fetch(filters).await
    }

    pub async fn set_date_range(&self, date_start: Option<NaiveDate>, date_end: Option<NaiveDate>) -> bool {
        let filters = BoardFilters { date_start, date_end, ..self.current_filters().await }.first_page();
        self.fetch(filters).await
    }

    /// Re-reads the counts; a failure leaves the previous counts in place.
    pub async fn refresh_counts(&self) -> bool {
        let generation = self.board.lock().await.begin_counts();
        match self.service.status_counts().await {
            Ok(counts) => self.board.lock().await.set_counts(generation, counts),
            Err(e) => {
                warn!("Status counts refresh failed: {e}");
                false
            }
        }
    }

    /// Optimistic status change.
    ///
    /// On failure the tentative status is dropped and the list is reconciled by reloading
    /// the first page without filters.
    pub async fn change_status(&self, id: &str, status: QuoteStatus) -> Result<(), BoardError> {
        self.board.lock().await.apply_tentative_status(id, status)?;

        match self.service.update_quote_status(id, status).await {
            Ok(()) => {
                {
                    let mut board = self.board.lock().await;
                    board.confirm_status(id);
                    board.push_notice(NoticeLevel::Success, STATUS_UPDATED);
                }
                info!(id = %id, status = %status, "Status change confirmed");
                self.refresh_counts().await;
                Ok(())
            }
            Err(e) => {
                {
                    let mut board = self.board.lock().await;
                    board.discard_tentative_status(id);
                    board.push_notice(NoticeLevel::Error, STATUS_UPDATE_FAILED);
                }
                warn!(id = %id, "Status change failed, reconciling: {e}");
                tokio::join!(self.fetch(BoardFilters::default()), self.refresh_counts());
                Err(BoardError::Remote(e))
            }
        }
    }

    pub async fn request_delete(&self, id: &str) -> Result<DeleteConfirmation, BoardError> {
        self.board.lock().await.request_delete(id)
    }

    pub async fn cancel_delete(&self) {
        self.board.lock().await.cancel_delete();
    }

    /// Carries out a confirmed delete. Nothing reaches the store without an active session.
    /// A busy row leaves the confirmation open.
    pub async fn confirm_delete(&self, confirmation: &DeleteConfirmation) -> Result<(), BoardError> {
        let confirmation = {
            let mut board = self.board.lock().await;
            if board.row(&confirmation.id).is_some_and(|row| row.is_busy()) {
                return Err(BoardError::RowBusy(confirmation.id.clone()));
            }
            board.take_delete_confirmation(confirmation)?
        };

        if self.sessions.active_session().await.is_none() {
            warn!(id = %confirmation.id, "Delete attempted without a session");
            self.board.lock().await.push_notice(NoticeLevel::Error, NO_ACTIVE_SESSION);
            return Err(BoardError::NoSession);
        }

        {
            let mut board = self.board.lock().await;
            if board.row(&confirmation.id).is_some_and(|row| row.is_busy()) {
                return Err(BoardError::RowBusy(confirmation.id.clone()));
            }
            board.mark_deleting(&confirmation.id, true);
        }

        match self.service.delete_quote(&confirmation.id).await {
            Ok(deleted) => {
                {
                    let mut board = self.board.lock().await;
                    board.remove_row(&deleted.id);
                    board.decrement_count(&deleted.status);
                    board.push_notice(NoticeLevel::Success, QUOTE_DELETED);
                }
                info!(id = %deleted.id, status = %deleted.status, "Quote deleted from board");
                self.fetch(confirmation.filters.clone()).await;
                self.refresh_counts().await;
                Ok(())
            }
            Err(e) => {
                let mut board = self.board.lock().await;
                board.mark_deleting(&confirmation.id, false);
                board.push_notice(NoticeLevel::Error, QUOTE_DELETE_FAILED);
                warn!(id = %confirmation.id, "Delete failed: {e}");
                Err(BoardError::Remote(e))
            }
        }
    }
}
