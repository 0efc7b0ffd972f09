use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{book::Book, patron::PatronId};

/// One copy of a book lent to a patron
///
/// Loans are never removed; a returned loan keeps its dates so fees and
/// history can still be reported.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Loan {
    /// Borrowing patron
    pub patron_id: PatronId,
    /// Catalog isbn of the borrowed book
    pub isbn: String,
    /// Day the book left the library
    pub borrow_date: NaiveDate,
    /// Last day the book may be kept without a fee
    pub due_date: NaiveDate,
    /// Day the book came back, if it has
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
}

impl Loan {
    /// Whether the book is still out
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    /// Whether this loan is for the given patron and book (isbn ignoring case)
    #[must_use]
    pub fn matches(&self, patron_id: &PatronId, isbn: &str) -> bool {
        self.patron_id == *patron_id && Book::normalize_isbn(&self.isbn) == Book::normalize_isbn(isbn)
    }
}
