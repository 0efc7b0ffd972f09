//! Read-only views built from the catalog and the ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::Catalog,
    error::{LibraryError, LibraryResult},
    ledger::LendingLedger,
    loan::Loan,
    patron::PatronId,
    policy::{LendingPolicy, Money},
};

/// One line of a patron's borrowing history
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HistoryEntry {
    /// Borrowed book
    pub isbn: String,
    /// Title at report time; empty if the book is no longer cataloged
    pub title: String,
    /// Day borrowed
    pub borrow_date: NaiveDate,
    /// Day due
    pub due_date: NaiveDate,
    /// Day returned, if returned
    pub return_date: Option<NaiveDate>,
    /// Late fee for this loan as of the report date
    pub fee_incurred: Money,
}

/// Everything the desk needs to know about one patron
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PatronStatus {
    /// The patron reported on
    pub patron_id: PatronId,
    /// Books still out, oldest first
    pub open_loans: Vec<Loan>,
    /// Sum of late fees over every loan, open and returned
    pub total_late_fees: Money,
    /// Number of books still out
    pub borrowed_count: usize,
    /// All loans in borrow order
    pub history: Vec<HistoryEntry>,
}

/// Late fee view for one patron and one book
///
/// Serializes as `{"patron_id", "isbn", "overdue", "days_overdue", "fee"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LateFeeQuote {
    pub patron_id: PatronId,
    pub isbn: String,
    pub overdue: bool,
    pub days_overdue: u64,
    pub fee: Money,
}

/// Build the status report for a patron as of a date
///
/// A well-formed id with no loans yields an empty report.
///
/// # Errors
///
/// Returns `LibraryError::Validation` for a malformed patron id.
pub fn patron_status(
    catalog: &Catalog,
    ledger: &LendingLedger,
    policy: &LendingPolicy,
    patron_id: &str,
    as_of: NaiveDate,
) -> LibraryResult<PatronStatus> {
    let patron_id = PatronId::parse(patron_id)?;

    let open_loans: Vec<Loan> = ledger.open_loans_for(&patron_id).cloned().collect();
    let history: Vec<HistoryEntry> = ledger
        .loans_for(&patron_id)
        .map(|loan| HistoryEntry {
            isbn: loan.isbn.clone(),
            title: catalog.get(&loan.isbn).map(|b| b.title().to_string()).unwrap_or_default(),
            borrow_date: loan.borrow_date,
            due_date: loan.due_date,
            return_date: loan.return_date,
            fee_incurred: policy.compute_late_fee(loan, as_of),
        })
        .collect();
    let total_late_fees: Money = history.iter().map(|entry| entry.fee_incurred).sum();

    Ok(PatronStatus {
        borrowed_count: open_loans.len(),
        patron_id,
        open_loans,
        total_late_fees,
        history,
    })
}

/// Quote the late fee on a patron's loan of one book
///
/// The open loan is quoted when there is one; otherwise the most recent
/// returned loan.
///
/// # Errors
///
/// - `LibraryError::Validation` for a malformed patron id
/// - `LibraryError::NotFound` if the patron never borrowed the book
pub fn late_fee_quote(
    ledger: &LendingLedger,
    policy: &LendingPolicy,
    patron_id: &str,
    isbn: &str,
    as_of: NaiveDate,
) -> LibraryResult<LateFeeQuote> {
    let patron_id = PatronId::parse(patron_id)?;
    let loan = ledger.current_or_latest(&patron_id, isbn).ok_or_else(|| {
        LibraryError::NotFound(format!("No loan of ISBN {isbn} for patron {patron_id}."))
    })?;

    Ok(LateFeeQuote {
        isbn: loan.isbn.clone(),
        overdue: policy.is_overdue(loan, as_of),
        days_overdue: policy.days_overdue(loan, as_of),
        fee: policy.compute_late_fee(loan, as_of),
        patron_id,
    })
}
