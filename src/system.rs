use std::{fmt, path::Path};

use chrono::NaiveDate;
use tracing::debug;

use crate::{
    book::Book,
    catalog::{Catalog, SearchField},
    clock::{Clock, SystemClock},
    error::{LibraryError, LibraryResult},
    events::{JournalEntry, LibraryEvent},
    ledger::{LendingLedger, ReturnReceipt},
    loan::Loan,
    observers::{ActivityLogger, LibraryObserver, OverdueNotifier},
    persistence::{LibrarySnapshot, SNAPSHOT_VERSION},
    policy::{LendingPolicy, Money},
    report::{self, LateFeeQuote, PatronStatus},
};

/// Number of journal entries kept unless configured otherwise
pub const DEFAULT_JOURNAL_SIZE: usize = 100;

/// The library: catalog, lending ledger and the rules that tie them together
///
/// Every mutation goes through this type so a book's available copies always
/// match the ledger's open loans.
pub struct LibrarySystem {
    /// Books owned by the library
    catalog: Catalog,
    /// Loans, open and returned
    ledger: LendingLedger,
    /// Lending rules
    policy: LendingPolicy,
    /// Source of today's date
    clock: Box<dyn Clock>,
    /// Recent events, oldest first
    journal: Vec<JournalEntry>,
    /// Maximum number of journal entries to keep
    max_journal_size: usize,
    /// Registered activity observers
    observers: Vec<Box<dyn LibraryObserver>>,
}

// Manual implementation of Debug for LibrarySystem
impl fmt::Debug for LibrarySystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibrarySystem")
            .field("catalog", &self.catalog)
            .field("ledger", &self.ledger)
            .field("policy", &self.policy)
            .field("clock", &self.clock)
            .field("journal", &self.journal)
            .field("max_journal_size", &self.max_journal_size)
            .field("observers_count", &self.observers.len())
            .finish()
    }
}

impl Default for LibrarySystem {
    fn default() -> Self {
        Self::new(LendingPolicy::default())
    }
}

impl LibrarySystem {
    /// Create an empty library using the system date and no observers
    #[must_use]
    pub fn new(policy: LendingPolicy) -> Self {
        Self {
            catalog: Catalog::new(),
            ledger: LendingLedger::new(),
            policy,
            clock: Box::new(SystemClock),
            journal: Vec::new(),
            max_journal_size: DEFAULT_JOURNAL_SIZE,
            observers: Vec::new(),
        }
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register the logging and overdue observers
    #[must_use]
    pub fn with_standard_observers(mut self) -> Self {
        self.register_observer(Box::new(ActivityLogger));
        self.register_observer(Box::new(OverdueNotifier));
        self
    }

    /// Register an observer to be notified of every event
    pub fn register_observer(&mut self, observer: Box<dyn LibraryObserver>) {
        self.observers.push(observer);
    }

    /// Limit how many journal entries are kept
    pub fn set_max_journal_size(&mut self, size: usize) {
        self.max_journal_size = size;
        self.trim_journal();
    }

    /// Today's date according to the configured clock
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    #[must_use]
    pub fn policy(&self) -> &LendingPolicy {
        &self.policy
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn ledger(&self) -> &LendingLedger {
        &self.ledger
    }

    /// Recent events, oldest first
    #[must_use]
    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    /// Add a book with no author
    ///
    /// # Errors
    ///
    /// See [`Catalog::add_book`].
    pub fn add_book(&mut self, isbn: &str, title: &str, copies: u32) -> LibraryResult<Book> {
        self.add_book_with_author(isbn, title, None, copies)
    }

    /// Add a book, optionally with its author
    ///
    /// # Errors
    ///
    /// See [`Catalog::add_book_with_author`].
    pub fn add_book_with_author(
        &mut self,
        isbn: &str,
        title: &str,
        author: Option<&str>,
        copies: u32,
    ) -> LibraryResult<Book> {
        let book = self.catalog.add_book_with_author(isbn, title, author, copies)?.clone();
        self.record(LibraryEvent::BookAdded {
            isbn: book.isbn().to_string(),
            title: book.title().to_string(),
            copies,
        });
        Ok(book)
    }

    /// All books ordered by title, then isbn
    #[must_use]
    pub fn list_books(&self) -> Vec<&Book> {
        self.catalog.list_books()
    }

    #[must_use]
    pub fn find_by_isbn(&self, isbn: &str) -> Vec<&Book> {
        self.catalog.find_by_isbn(isbn)
    }

    #[must_use]
    pub fn find_by_title_substring(&self, query: &str) -> Vec<&Book> {
        self.catalog.find_by_title_substring(query)
    }

    #[must_use]
    pub fn search(&self, field: SearchField, query: &str) -> Vec<&Book> {
        self.catalog.search(field, query)
    }

    /// Lend a copy of a book to a patron, dated today
    ///
    /// # Errors
    ///
    /// See [`LendingLedger::borrow`].
    pub fn borrow(&mut self, patron_id: &str, isbn: &str) -> LibraryResult<Loan> {
        let today = self.today();
        let loan = self.ledger.borrow(&mut self.catalog, &self.policy, patron_id, isbn, today)?;
        self.record(LibraryEvent::Borrowed {
            patron_id: loan.patron_id.clone(),
            isbn: loan.isbn.clone(),
            due_date: loan.due_date,
        });
        Ok(loan)
    }

    /// Take a book back from a patron, dated today, and report any late fee
    ///
    /// # Errors
    ///
    /// See [`LendingLedger::return_book`].
    pub fn return_book(&mut self, patron_id: &str, isbn: &str) -> LibraryResult<ReturnReceipt> {
        let today = self.today();
        let receipt =
            self.ledger.return_book(&mut self.catalog, &self.policy, patron_id, isbn, today)?;
        self.record(LibraryEvent::Returned {
            patron_id: receipt.loan.patron_id.clone(),
            isbn: receipt.loan.isbn.clone(),
            days_overdue: receipt.days_overdue,
            late_fee: receipt.late_fee,
        });
        Ok(receipt)
    }

    /// Late fee on a loan as of today
    #[must_use]
    pub fn compute_late_fee(&self, loan: &Loan) -> Money {
        self.policy.compute_late_fee(loan, self.today())
    }

    /// Whether a loan is overdue as of today
    #[must_use]
    pub fn is_overdue(&self, loan: &Loan) -> bool {
        self.policy.is_overdue(loan, self.today())
    }

    /// Late fee view for one patron and book, as of today
    ///
    /// # Errors
    ///
    /// See [`report::late_fee_quote`].
    pub fn late_fee_quote(&self, patron_id: &str, isbn: &str) -> LibraryResult<LateFeeQuote> {
        report::late_fee_quote(&self.ledger, &self.policy, patron_id, isbn, self.today())
    }

    /// Status report for a patron, as of today
    ///
    /// # Errors
    ///
    /// See [`report::patron_status`].
    pub fn patron_status(&self, patron_id: &str) -> LibraryResult<PatronStatus> {
        report::patron_status(&self.catalog, &self.ledger, &self.policy, patron_id, self.today())
    }

    /// Journal an event and notify observers
    fn record(&mut self, event: LibraryEvent) {
        let entry = JournalEntry { date: self.today(), event };
        for observer in &self.observers {
            observer.on_event(&entry);
        }
        self.journal.push(entry);
        self.trim_journal();
    }

    /// Drop the oldest journal entries beyond the size limit
    fn trim_journal(&mut self) {
        let excess = self.journal.len().saturating_sub(self.max_journal_size);
        if excess > 0 {
            self.journal = self.journal.split_off(excess);
        }
    }

    /// Capture the catalog, ledger and journal
    #[must_use]
    pub fn snapshot(&self) -> LibrarySnapshot {
        LibrarySnapshot {
            version: SNAPSHOT_VERSION,
            books: self.catalog.books().cloned().collect(),
            loans: self.ledger.loans().to_vec(),
            journal: self.journal.clone(),
        }
    }

    /// Rebuild a library from a snapshot
    ///
    /// The result uses the system clock and has no observers.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Load` if the catalog is inconsistent, a loan
    /// refers to an unknown book, or a book's available copies disagree with
    /// its open loans.
    pub fn from_snapshot(snapshot: LibrarySnapshot, policy: LendingPolicy) -> LibraryResult<Self> {
        let catalog = Catalog::from_books(snapshot.books)?;
        let ledger = LendingLedger::from_loans(snapshot.loans);

        if let Some(orphan) = ledger.loans().iter().find(|loan| catalog.get(&loan.isbn).is_none()) {
            return Err(LibraryError::Load(format!(
                "Loan refers to unknown isbn {:?}",
                orphan.isbn
            )));
        }
        for book in catalog.list_books() {
            let open = ledger.open_count_for_isbn(book.isbn());
            let on_loan = usize::try_from(book.total_copies().saturating_sub(book.available_copies()))
                .unwrap_or(usize::MAX);
            if open != on_loan {
                return Err(LibraryError::Load(format!(
                    "Isbn {:?} has {on_loan} copies out but {open} open loans",
                    book.isbn()
                )));
            }
        }

        let mut system = Self::new(policy);
        system.catalog = catalog;
        system.ledger = ledger;
        system.journal = snapshot.journal;
        system.trim_journal();
        Ok(system)
    }

    /// Save the library state to a JSON file
    ///
    /// # Errors
    ///
    /// See [`LibrarySnapshot::save_to_file`].
    pub fn save_state_to_file(&self, path: &Path) -> LibraryResult<()> {
        self.snapshot().save_to_file(path)
    }

    /// Load the library state from a JSON file
    ///
    /// # Errors
    ///
    /// See [`LibrarySnapshot::load_from_file`] and
    /// [`LibrarySystem::from_snapshot`].
    pub fn load_state_from_file(path: &Path, policy: LendingPolicy) -> LibraryResult<Self> {
        let snapshot = LibrarySnapshot::load_from_file(path)?;
        let system = Self::from_snapshot(snapshot, policy)?;
        debug!(
            path = %path.display(),
            books = system.catalog.len(),
            loans = system.ledger.loans().len(),
            "library loaded"
        );
        Ok(system)
    }
}

impl fmt::Display for LibrarySystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = self.ledger.loans().iter().filter(|loan| loan.is_open()).count();
        write!(f, "{} titles in catalog, {open} books on loan", self.catalog.len())
    }
}
