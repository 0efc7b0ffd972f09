use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{patron::PatronId, policy::Money};

/// Something that changed the catalog or the ledger
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LibraryEvent {
    /// A title was added to the catalog
    BookAdded {
        /// Catalog isbn
        isbn: String,
        /// Title as stored
        title: String,
        /// Copies added
        copies: u32,
    },
    /// A patron borrowed a copy
    Borrowed {
        /// Borrowing patron
        patron_id: PatronId,
        /// Borrowed book
        isbn: String,
        /// When the copy is due back
        due_date: NaiveDate,
    },
    /// A patron brought a copy back
    Returned {
        /// Returning patron
        patron_id: PatronId,
        /// Returned book
        isbn: String,
        /// Days past the due date
        days_overdue: u64,
        /// Fee the return incurred
        late_fee: Money,
    },
}

/// A journal line: the event and the day it happened
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct JournalEntry {
    /// Library date of the event
    pub date: NaiveDate,
    /// What happened
    pub event: LibraryEvent,
}
