use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    book::Book,
    catalog::Catalog,
    error::{LibraryError, LibraryResult},
    loan::Loan,
    patron::PatronId,
    policy::{LendingPolicy, Money},
};

/// What a successful return hands back to the patron
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReturnReceipt {
    /// The loan, now closed
    pub loan: Loan,
    /// Title of the returned book
    pub title: String,
    /// Days the book came back late
    pub days_overdue: u64,
    /// Fee the late return incurred
    pub late_fee: Money,
}

/// Every loan ever made, in the order they were made
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LendingLedger {
    /// Open and returned loans, oldest first
    loans: Vec<Loan>,
}

impl LendingLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from stored loans
    #[must_use]
    pub fn from_loans(loans: Vec<Loan>) -> Self {
        Self { loans }
    }

    /// All loans, oldest first
    #[must_use]
    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    /// Every loan of one patron, oldest first
    pub fn loans_for<'a>(&'a self, patron_id: &'a PatronId) -> impl Iterator<Item = &'a Loan> {
        self.loans.iter().filter(move |loan| loan.patron_id == *patron_id)
    }

    /// Loans the patron has not returned yet
    pub fn open_loans_for<'a>(
        &'a self,
        patron_id: &'a PatronId,
    ) -> impl Iterator<Item = &'a Loan> {
        self.loans_for(patron_id).filter(|loan| loan.is_open())
    }

    /// Number of books the patron currently holds
    #[must_use]
    pub fn open_count(&self, patron_id: &PatronId) -> usize {
        self.open_loans_for(patron_id).count()
    }

    /// Open loans of one book
    #[must_use]
    pub fn open_count_for_isbn(&self, isbn: &str) -> usize {
        let key = Book::normalize_isbn(isbn);
        self.loans
            .iter()
            .filter(|loan| loan.is_open() && Book::normalize_isbn(&loan.isbn) == key)
            .count()
    }

    /// The loan a fee quote refers to: the oldest open loan of this book, or
    /// failing that the most recently returned one
    #[must_use]
    pub fn current_or_latest(&self, patron_id: &PatronId, isbn: &str) -> Option<&Loan> {
        let mut matching = self.loans.iter().filter(|loan| loan.matches(patron_id, isbn));
        matching.clone().find(|loan| loan.is_open()).or_else(|| matching.next_back())
    }

    /// Lend one copy of a book to a patron
    ///
    /// Checks run in order: patron id format, known isbn, a copy on the
    /// shelf, the patron's borrowing limit. Nothing changes unless all pass.
    ///
    /// # Errors
    ///
    /// - `LibraryError::Validation` for a malformed patron id
    /// - `LibraryError::NotFound` for an unknown isbn
    /// - `LibraryError::PolicyViolation` when no copy is available or the
    ///   patron is at the limit
    pub fn borrow(
        &mut self,
        catalog: &mut Catalog,
        policy: &LendingPolicy,
        patron_id: &str,
        isbn: &str,
        today: NaiveDate,
    ) -> LibraryResult<Loan> {
        let patron_id = PatronId::parse(patron_id)?;
        let book = catalog
            .get_mut(isbn)
            .ok_or_else(|| LibraryError::NotFound(format!("Book with ISBN {isbn} not found.")))?;

        policy.check_borrow(self.open_count(&patron_id), book.available_copies())?;
        let due_date = policy.due_date_for(today)?;
        book.check_out_copy()?;

        debug!(
            patron = %patron_id,
            isbn = book.isbn(),
            %due_date,
            available = book.available_copies(),
            "loan opened"
        );

        let loan = Loan {
            patron_id,
            isbn: book.isbn().to_string(),
            borrow_date: today,
            due_date,
            return_date: None,
        };
        self.loans.push(loan.clone());
        Ok(loan)
    }

    /// Take a book back from a patron and close the oldest matching loan
    ///
    /// # Errors
    ///
    /// - `LibraryError::Validation` for a malformed patron id, or a return
    ///   dated before the book was borrowed
    /// - `LibraryError::NotFound` when the patron holds no open loan of the
    ///   book
    pub fn return_book(
        &mut self,
        catalog: &mut Catalog,
        policy: &LendingPolicy,
        patron_id: &str,
        isbn: &str,
        today: NaiveDate,
    ) -> LibraryResult<ReturnReceipt> {
        let patron_id = PatronId::parse(patron_id)?;
        let loan = self
            .loans
            .iter_mut()
            .find(|loan| loan.is_open() && loan.matches(&patron_id, isbn))
            .ok_or_else(|| {
                LibraryError::NotFound(format!(
                    "Book with ISBN {isbn} is not borrowed by patron {patron_id}."
                ))
            })?;
        if today < loan.borrow_date {
            return Err(LibraryError::Validation(format!(
                "Return date {today} precedes borrow date {}.",
                loan.borrow_date
            )));
        }

        let book = catalog.get_mut(&loan.isbn).ok_or_else(|| {
            LibraryError::NotFound(format!("Book with ISBN {} not found.", loan.isbn))
        })?;
        book.check_in_copy()?;
        loan.return_date = Some(today);

        let days_overdue = policy.days_overdue(loan, today);
        let late_fee = policy.compute_late_fee(loan, today);
        debug!(patron = %patron_id, isbn = book.isbn(), days_overdue, "loan closed");

        Ok(ReturnReceipt {
            loan: loan.clone(),
            title: book.title().to_string(),
            days_overdue,
            late_fee,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed "today" for ledger tests
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default()
    }

    #[test]
    fn borrow_then_return_restores_copies() -> LibraryResult<()> {
        let mut catalog = Catalog::new();
        catalog.add_book("111", "Book A", 1)?;
        let mut ledger = LendingLedger::new();
        let policy = LendingPolicy::default();

        let loan = ledger.borrow(&mut catalog, &policy, "123456", "111", today())?;
        assert_eq!(loan.due_date, policy.due_date_for(today())?);
        assert_eq!(catalog.get("111").map(Book::available_copies), Some(0));

        let receipt = ledger.return_book(&mut catalog, &policy, "123456", "111", today())?;
        assert_eq!(receipt.late_fee, Money::ZERO);
        assert_eq!(receipt.loan.return_date, Some(today()));
        assert_eq!(catalog.get("111").map(Book::available_copies), Some(1));
        assert_eq!(ledger.loans().len(), 1);
        Ok(())
    }

    #[test]
    fn unknown_isbn_is_not_found() {
        let mut catalog = Catalog::new();
        let mut ledger = LendingLedger::new();
        let result =
            ledger.borrow(&mut catalog, &LendingPolicy::default(), "123456", "999", today());
        assert!(matches!(result, Err(LibraryError::NotFound(_))));
        assert!(ledger.loans().is_empty());
    }

    #[test]
    fn malformed_patron_is_rejected_before_lookup() {
        let mut catalog = Catalog::new();
        let mut ledger = LendingLedger::new();
        let result = ledger.borrow(&mut catalog, &LendingPolicy::default(), "12a456", "999", today());
        assert!(matches!(result, Err(LibraryError::Validation(_))));
    }

    #[test]
    fn return_before_borrow_date_is_rejected() -> LibraryResult<()> {
        let mut catalog = Catalog::new();
        catalog.add_book("111", "Book A", 1)?;
        let mut ledger = LendingLedger::new();
        let policy = LendingPolicy::default();
        ledger.borrow(&mut catalog, &policy, "123456", "111", today())?;

        let earlier = today().pred_opt().unwrap_or_default();
        let result = ledger.return_book(&mut catalog, &policy, "123456", "111", earlier);
        assert!(matches!(result, Err(LibraryError::Validation(_))));
        assert_eq!(ledger.open_count(&PatronId::parse("123456")?), 1);
        assert_eq!(catalog.get("111").map(Book::available_copies), Some(0));
        Ok(())
    }

    #[test]
    fn returns_close_oldest_loan_first() -> LibraryResult<()> {
        let mut catalog = Catalog::new();
        catalog.add_book("111", "Book A", 2)?;
        let mut ledger = LendingLedger::new();
        let policy = LendingPolicy::default();
        let later = today().succ_opt().unwrap_or_default();

        ledger.borrow(&mut catalog, &policy, "123456", "111", today())?;
        ledger.borrow(&mut catalog, &policy, "123456", "111", later)?;
        let receipt = ledger.return_book(&mut catalog, &policy, "123456", "111", later)?;

        assert_eq!(receipt.loan.borrow_date, today());
        let patron = PatronId::parse("123456")?;
        let quoted = ledger.current_or_latest(&patron, "111").map(|l| l.borrow_date);
        assert_eq!(quoted, Some(later));
        Ok(())
    }
}
