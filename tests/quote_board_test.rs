mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use admin_panel_backend::board::state::{
    FETCH_FAILED, NO_ACTIVE_SESSION, QUOTE_DELETED, QUOTE_DELETE_FAILED, STATUS_UPDATED, STATUS_UPDATE_FAILED,
};
use admin_panel_backend::board::{
    BoardController, BoardError, BoardFilters, DeleteConfirmation, LoadPhase, NoticeLevel, QuoteBoard, SessionSource,
    TokenSessionSource,
};
use admin_panel_backend::dto::quote_dto::{QuotePage, QuoteQuery, StatusFilter};
use admin_panel_backend::export::ExportFile;
use admin_panel_backend::model::quote::{Quote, QuoteView};
use admin_panel_backend::model::quote_status::{QuoteStatus, StatusCounts, StatusValue};
use admin_panel_backend::repository::quote_repo::InMemoryQuoteRepository;
use admin_panel_backend::service::auth_service::Session;
use admin_panel_backend::service::quote_service::{QuoteService, QuoteServiceImpl};
use admin_panel_backend::util::error::ServiceError;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use common::{admin_app, at, quote, quotes};
use tokio::sync::{oneshot, Mutex};

/// Real service underneath, with hooks to hold back or fail individual calls.
struct ScriptedService {
    inner: QuoteServiceImpl,
    status_gate: Mutex<Option<oneshot::Receiver<()>>>,
    list_gate: Mutex<Option<oneshot::Receiver<()>>>,
    list_held: AtomicBool,
    fail_status: AtomicBool,
    fail_list: AtomicBool,
    fail_delete: AtomicBool,
    delete_calls: AtomicUsize,
}

impl ScriptedService {
    fn new(quotes: Vec<Quote>) -> Self {
        ScriptedService {
            inner: QuoteServiceImpl::new(Arc::new(InMemoryQuoteRepository::with_quotes(quotes))),
            status_gate: Mutex::new(None),
            list_gate: Mutex::new(None),
            list_held: AtomicBool::new(false),
            fail_status: AtomicBool::new(false),
            fail_list: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            delete_calls: AtomicUsize::new(0),
        }
    }

    async fn hold_next_status_update(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.status_gate.lock().await = Some(rx);
        tx
    }

    async fn hold_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.list_gate.lock().await = Some(rx);
        tx
    }
}

fn unreachable_store() -> ServiceError {
    ServiceError::InternalError("store unreachable".to_string())
}

#[async_trait]
impl QuoteService for ScriptedService {
    /// A held list reads the store first, then waits before answering.
    async fn list_quotes(&self, query: QuoteQuery) -> Result<QuotePage, ServiceError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(unreachable_store());
        }
        let page = self.inner.list_quotes(query).await;
        let gate = self.list_gate.lock().await.take();
        if let Some(gate) = gate {
            self.list_held.store(true, Ordering::SeqCst);
            let _ = gate.await;
        }
        page
    }

    async fn get_quote(&self, id: &str) -> Result<QuoteView, ServiceError> {
        self.inner.get_quote(id).await
    }

    async fn update_quote_status(&self, id: &str, status: QuoteStatus) -> Result<(), ServiceError> {
        let gate = self.status_gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(unreachable_store());
        }
        self.inner.update_quote_status(id, status).await
    }

    async fn delete_quote(&self, id: &str) -> Result<Quote, ServiceError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(unreachable_store());
        }
        self.inner.delete_quote(id).await
    }

    async fn status_counts(&self) -> Result<StatusCounts, ServiceError> {
        self.inner.status_counts().await
    }

    async fn export_quote(&self, id: &str) -> Result<ExportFile, ServiceError> {
        self.inner.export_quote(id).await
    }

    async fn export_quotes(&self, query: QuoteQuery) -> Result<ExportFile, ServiceError> {
        self.inner.export_quotes(query).await
    }
}

struct FixedSession(AtomicBool);

#[async_trait]
impl SessionSource for FixedSession {
    async fn active_session(&self) -> Option<Session> {
        if !self.0.load(Ordering::SeqCst) {
            return None;
        }
        Some(Session {
            user_id: "admin".to_string(),
            email: "admin@example.com".to_string(),
            role: "admin".to_string(),
            token_id: "jti".to_string(),
            expires_at: Utc::now(),
        })
    }
}

struct Harness {
    service: Arc<ScriptedService>,
    controller: BoardController,
}

/// Twelve quotes q00..q11, newest last, cycling pending/approved.
async fn mounted(signed_in: bool) -> Harness {
    let service = Arc::new(ScriptedService::new(quotes(12, &[QuoteStatus::Pending, QuoteStatus::Approved])));
    let sessions = Arc::new(FixedSession(AtomicBool::new(signed_in)));
    let controller = BoardController::new(service.clone(), sessions);
    controller.mount().await;
    Harness { service, controller }
}

async fn wait_for<F>(controller: &BoardController, condition: F) -> QuoteBoard
where
    F: Fn(&QuoteBoard) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let board = controller.snapshot().await;
            if condition(&board) {
                return board;
            }
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("board never reached the expected state")
}

fn has_notice(board: &QuoteBoard, level: NoticeLevel, message: &str) -> bool {
    board.notices.iter().any(|n| n.level == level && n.message == message)
}

fn status_of(board: &QuoteBoard, id: &str) -> StatusValue {
    board.row(id).unwrap().quote.quote.status.clone()
}

#[tokio::test]
async fn test_mount_loads_first_page_and_counts() {
    let h = mounted(true).await;
    let board = h.controller.snapshot().await;
    assert_eq!(board.phase, LoadPhase::Idle);
    assert_eq!(board.rows.len(), 10);
    assert_eq!(board.total, 12);
    assert_eq!(board.rows[0].id(), "q11");
    assert_eq!(board.counts.get(QuoteStatus::Pending), 6);
    assert_eq!(board.counts.get(QuoteStatus::Approved), 6);
    assert_eq!(board.filters, BoardFilters::default());
}

#[tokio::test]
async fn test_optimistic_status_is_visible_before_remote_completes() {
    let h = mounted(true).await;
    let release = h.service.hold_next_status_update().await;

    let controller = h.controller.clone();
    let task = tokio::spawn(async move { controller.change_status("q10", QuoteStatus::Completed).await });

    let board = wait_for(&h.controller, |b| b.row("q10").is_some_and(|r| r.is_updating)).await;
    assert_eq!(status_of(&board, "q10"), StatusValue::Known(QuoteStatus::Completed));
    // the store has not been written yet
    let stored = h.service.get_quote("q10").await.unwrap();
    assert_eq!(stored.quote.status, StatusValue::Known(QuoteStatus::Pending));

    release.send(()).unwrap();
    task.await.unwrap().unwrap();

    let board = h.controller.snapshot().await;
    let row = board.row("q10").unwrap();
    assert!(!row.is_updating);
    assert!(row.pending.is_none());
    assert_eq!(status_of(&board, "q10"), StatusValue::Known(QuoteStatus::Completed));
    assert!(has_notice(&board, NoticeLevel::Success, STATUS_UPDATED));
    assert_eq!(board.counts.get(QuoteStatus::Completed), 1);
    assert_eq!(board.counts.get(QuoteStatus::Pending), 5);
}

#[tokio::test]
async fn test_busy_row_rejects_second_operation() {
    let h = mounted(true).await;
    let release = h.service.hold_next_status_update().await;
    let controller = h.controller.clone();
    let task = tokio::spawn(async move { controller.change_status("q11", QuoteStatus::OnHold).await });
    wait_for(&h.controller, |b| b.row("q11").is_some_and(|r| r.is_updating)).await;

    assert_eq!(
        h.controller.change_status("q11", QuoteStatus::Cancelled).await,
        Err(BoardError::RowBusy("q11".to_string()))
    );
    assert_eq!(h.controller.request_delete("q11").await, Err(BoardError::RowBusy("q11".to_string())));
    assert!(matches!(
        h.controller.change_status("missing", QuoteStatus::Cancelled).await,
        Err(BoardError::RowNotFound(_))
    ));

    release.send(()).unwrap();
    task.await.unwrap().unwrap();
    assert!(h.controller.request_delete("q11").await.is_ok());
}

#[tokio::test]
async fn test_failed_status_update_reconciles_with_unfiltered_first_page() {
    let h = mounted(true).await;
    h.controller.set_status_filter(StatusFilter::Only(QuoteStatus::Pending)).await;
    let board = h.controller.snapshot().await;
    assert_eq!(board.total, 6);
    let target = board.rows[0].id().to_string();

    h.service.fail_status.store(true, Ordering::SeqCst);
    let res = h.controller.change_status(&target, QuoteStatus::Approved).await;
    assert!(matches!(res, Err(BoardError::Remote(_))));

    let board = h.controller.snapshot().await;
    assert_eq!(board.filters, BoardFilters::default());
    assert_eq!(board.total, 12);
    assert_eq!(board.rows.len(), 10);
    assert_eq!(status_of(&board, &target), StatusValue::Known(QuoteStatus::Pending));
    assert!(!board.row(&target).unwrap().is_busy());
    assert!(has_notice(&board, NoticeLevel::Error, STATUS_UPDATE_FAILED));
    assert_eq!(board.counts.get(QuoteStatus::Pending), 6);
}

#[tokio::test]
async fn test_stale_page_never_overwrites_newer_results() {
    let h = mounted(true).await;
    let release = h.service.hold_next_list().await;

    let controller = h.controller.clone();
    let slow = tokio::spawn(async move { controller.set_search("jane").await });
    wait_until_list_held(&h.service).await;

    assert!(h.controller.set_search("nobody-matches-this").await);
    release.send(()).unwrap();
    assert!(!slow.await.unwrap());

    let board = h.controller.snapshot().await;
    assert!(board.rows.is_empty());
    assert_eq!(board.total, 0);
    assert_eq!(board.filters.search, "nobody-matches-this");
}

async fn wait_until_list_held(service: &ScriptedService) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !service.list_held.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_page_read_before_confirmed_status_does_not_revert_it() {
    let h = mounted(true).await;
    let release = h.service.hold_next_list().await;

    let controller = h.controller.clone();
    let late = tokio::spawn(async move { controller.fetch(BoardFilters::default()).await });
    wait_until_list_held(&h.service).await;

    h.controller.change_status("q10", QuoteStatus::Completed).await.unwrap();
    release.send(()).unwrap();
    assert!(late.await.unwrap());

    let board = h.controller.snapshot().await;
    assert_eq!(status_of(&board, "q10"), StatusValue::Known(QuoteStatus::Completed));
    assert!(board.row("q10").is_some_and(|r| r.pending.is_none() && !r.is_busy()));
    let stored = h.service.get_quote("q10").await.unwrap();
    assert_eq!(stored.quote.status, StatusValue::Known(QuoteStatus::Completed));
}

#[tokio::test]
async fn test_page_read_before_delete_does_not_bring_the_row_back() {
    let h = mounted(true).await;
    let release = h.service.hold_next_list().await;

    let controller = h.controller.clone();
    let late = tokio::spawn(async move { controller.fetch(BoardFilters::default()).await });
    wait_until_list_held(&h.service).await;

    let confirmation = h.controller.request_delete("q11").await.unwrap();
    h.controller.confirm_delete(&confirmation).await.unwrap();
    release.send(()).unwrap();
    late.await.unwrap();

    let board = h.controller.snapshot().await;
    assert!(board.row("q11").is_none());
    assert_eq!(board.total, 11);
}

#[tokio::test]
async fn test_busy_row_keeps_delete_confirmation_open() {
    let h = mounted(true).await;
    let confirmation = h.controller.request_delete("q11").await.unwrap();

    let release = h.service.hold_next_status_update().await;
    let controller = h.controller.clone();
    let task = tokio::spawn(async move { controller.change_status("q11", QuoteStatus::OnHold).await });
    wait_for(&h.controller, |b| b.row("q11").is_some_and(|r| r.is_updating)).await;

    assert_eq!(h.controller.confirm_delete(&confirmation).await, Err(BoardError::RowBusy("q11".to_string())));
    assert_eq!(h.controller.snapshot().await.pending_delete, Some(confirmation.clone()));
    assert_eq!(h.service.delete_calls.load(Ordering::SeqCst), 0);

    release.send(()).unwrap();
    task.await.unwrap().unwrap();
    h.controller.confirm_delete(&confirmation).await.unwrap();
    assert_eq!(h.service.delete_calls.load(Ordering::SeqCst), 1);
    assert!(h.controller.snapshot().await.row("q11").is_none());
}

#[tokio::test]
async fn test_failed_fetch_keeps_displayed_rows() {
    let h = mounted(true).await;
    let before = h.controller.snapshot().await.rows;
    h.service.fail_list.store(true, Ordering::SeqCst);

    assert!(h.controller.set_page(2).await);
    let board = h.controller.snapshot().await;
    assert_eq!(board.rows, before);
    assert_eq!(board.phase, LoadPhase::Idle);
    assert!(has_notice(&board, NoticeLevel::Error, FETCH_FAILED));
}

#[tokio::test]
async fn test_filter_change_resets_to_first_page() {
    let h = mounted(true).await;
    h.controller.set_page(2).await;
    assert_eq!(h.controller.snapshot().await.rows.len(), 2);

    h.controller.set_status_filter(StatusFilter::Only(QuoteStatus::Approved)).await;
    let board = h.controller.snapshot().await;
    assert_eq!(board.filters.page, 1);
    assert_eq!(board.rows.len(), 6);
}

#[tokio::test]
async fn test_delete_without_session_stops_before_remote_call() {
    let h = mounted(false).await;
    let confirmation = h.controller.request_delete("q11").await.unwrap();

    assert_eq!(h.controller.confirm_delete(&confirmation).await, Err(BoardError::NoSession));
    assert_eq!(h.service.delete_calls.load(Ordering::SeqCst), 0);

    let board = h.controller.snapshot().await;
    assert!(board.row("q11").is_some_and(|r| !r.is_deleting));
    assert_eq!(board.total, 12);
    assert!(has_notice(&board, NoticeLevel::Error, NO_ACTIVE_SESSION));
}

#[tokio::test]
async fn test_delete_requires_prior_confirmation() {
    let h = mounted(true).await;
    let forged = DeleteConfirmation {
        id: "q11".to_string(),
        prior_status: StatusValue::Known(QuoteStatus::Approved),
        filters: BoardFilters::default(),
    };
    assert!(matches!(h.controller.confirm_delete(&forged).await, Err(BoardError::NotConfirmed(_))));

    let confirmation = h.controller.request_delete("q11").await.unwrap();
    h.controller.cancel_delete().await;
    assert!(matches!(h.controller.confirm_delete(&confirmation).await, Err(BoardError::NotConfirmed(_))));
    assert_eq!(h.service.delete_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_confirmed_delete_updates_counts_and_reruns_query() {
    let h = mounted(true).await;
    // q11 is approved
    let confirmation = h.controller.request_delete("q11").await.unwrap();
    assert_eq!(confirmation.prior_status, StatusValue::Known(QuoteStatus::Approved));

    h.controller.confirm_delete(&confirmation).await.unwrap();
    assert_eq!(h.service.delete_calls.load(Ordering::SeqCst), 1);

    let board = h.controller.snapshot().await;
    assert!(board.row("q11").is_none());
    assert_eq!(board.total, 11);
    assert_eq!(board.rows.len(), 10);
    assert_eq!(board.counts.get(QuoteStatus::Approved), 5);
    assert_eq!(board.counts.get(QuoteStatus::Pending), 6);
    assert!(board.pending_delete.is_none());
    assert!(has_notice(&board, NoticeLevel::Success, QUOTE_DELETED));
}

#[tokio::test]
async fn test_failed_delete_only_clears_busy_flag() {
    let h = mounted(true).await;
    h.service.fail_delete.store(true, Ordering::SeqCst);
    let confirmation = h.controller.request_delete("q10").await.unwrap();

    assert!(matches!(h.controller.confirm_delete(&confirmation).await, Err(BoardError::Remote(_))));
    let board = h.controller.snapshot().await;
    assert!(board.row("q10").is_some_and(|r| !r.is_deleting));
    assert_eq!(board.total, 12);
    assert_eq!(board.counts.get(QuoteStatus::Pending), 6);
    assert!(has_notice(&board, NoticeLevel::Error, QUOTE_DELETE_FAILED));
}

#[tokio::test]
async fn test_date_range_narrows_the_list() {
    let service = Arc::new(ScriptedService::new(vec![
        quote("jan", QuoteStatus::Pending, at(2025, 1, 15, 12, 0)),
        quote("feb", QuoteStatus::Pending, at(2025, 2, 15, 12, 0)),
        quote("mar", QuoteStatus::Pending, at(2025, 3, 15, 12, 0)),
    ]));
    let controller = BoardController::new(service, Arc::new(FixedSession(AtomicBool::new(true))));
    controller.mount().await;

    controller
        .set_date_range(NaiveDate::from_ymd_opt(2025, 2, 1), NaiveDate::from_ymd_opt(2025, 2, 28))
        .await;
    let board = controller.snapshot().await;
    assert_eq!(board.total, 1);
    assert_eq!(board.rows[0].id(), "feb");
    // counts always cover the whole table
    assert_eq!(board.counts.get(QuoteStatus::Pending), 3);
}

#[tokio::test]
async fn test_token_session_source_follows_sign_out() {
    let (_, services, token) = admin_app(quotes(3, &[QuoteStatus::Pending])).await;
    let sessions = Arc::new(TokenSessionSource::new(services.auth.clone(), Some(token.clone())));
    let controller = BoardController::new(services.quotes.clone(), sessions.clone());
    controller.mount().await;

    let confirmation = controller.request_delete("q02").await.unwrap();
    controller.confirm_delete(&confirmation).await.unwrap();
    assert_eq!(controller.snapshot().await.total, 2);

    let session = sessions.active_session().await.unwrap();
    services.auth.sign_out(&session, None).await.unwrap();
    let confirmation = controller.request_delete("q01").await.unwrap();
    assert_eq!(controller.confirm_delete(&confirmation).await, Err(BoardError::NoSession));
    assert!(services.quotes.get_quote("q01").await.is_ok());

    sessions.set_token(None).await;
    assert!(sessions.active_session().await.is_none());
}
