//! Book catalog and patron lending ledger for a small library.
//!
//! This crate keeps an in-memory catalog of books and a ledger of loans,
//! enforces the lending rules (six-digit patron ids, a limit of open loans,
//! fixed loan period) and reports late fees and per-patron status.

pub mod book;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod ledger;
pub mod loan;
pub mod observers;
pub mod patron;
pub mod persistence;
pub mod policy;
pub mod report;
pub mod system;

pub use book::Book;
pub use catalog::{Catalog, SearchField};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::LibraryConfig;
pub use display::LibraryDisplay;
pub use error::{LibraryError, LibraryResult};
pub use events::{JournalEntry, LibraryEvent};
pub use ledger::{LendingLedger, ReturnReceipt};
pub use loan::Loan;
pub use patron::PatronId;
pub use policy::{LendingPolicy, Money};
pub use report::{LateFeeQuote, PatronStatus};
pub use system::LibrarySystem;
