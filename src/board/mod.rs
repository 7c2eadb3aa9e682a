//! The admin quote list as a single state owner.
//!
//! [`state::QuoteBoard`] holds rows, counts, filters and notices and only changes through
//! synchronous transitions. [`controller::BoardController`] runs those transitions against
//! the quote service, never holding the board lock across a remote call.

pub mod controller;
pub mod state;

pub use controller::{BoardController, SessionSource, TokenSessionSource};
pub use state::{
    BoardError, BoardFilters, BoardRow, DeleteConfirmation, FetchTicket, LoadPhase, Notice, NoticeLevel,
    PendingStatus, QuoteBoard,
};
