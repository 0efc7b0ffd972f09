use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, LibraryResult};

/// Longest title the catalog accepts, in characters
pub const MAX_TITLE_LEN: usize = 200;

/// Longest author name the catalog accepts, in characters
pub const MAX_AUTHOR_LEN: usize = 100;

/// A title held by the library and how many of its copies are on the shelf
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Book {
    /// Catalog key, unique ignoring case
    isbn: String,
    /// Display title
    title: String,
    /// Author, when one was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    /// Copies owned by the library
    total_copies: u32,
    /// Copies currently on the shelf
    available_copies: u32,
}

impl Book {
    /// Build a validated book with every copy on the shelf
    ///
    /// Surrounding whitespace is trimmed from every text field and an empty
    /// author is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Validation` for an empty isbn or title, an
    /// over-long title or author, or zero copies.
    pub fn new(isbn: &str, title: &str, author: Option<&str>, copies: u32) -> LibraryResult<Self> {
        let isbn = isbn.trim();
        if isbn.is_empty() {
            return Err(LibraryError::Validation("ISBN is required.".to_string()));
        }

        let title = title.trim();
        if title.is_empty() {
            return Err(LibraryError::Validation("Title is required.".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(LibraryError::Validation(format!(
                "Title must be at most {MAX_TITLE_LEN} characters."
            )));
        }

        let author = author.map(str::trim).filter(|a| !a.is_empty());
        if author.is_some_and(|a| a.chars().count() > MAX_AUTHOR_LEN) {
            return Err(LibraryError::Validation(format!(
                "Author must be at most {MAX_AUTHOR_LEN} characters."
            )));
        }

        if copies == 0 {
            return Err(LibraryError::Validation(
                "Total copies must be a positive integer.".to_string(),
            ));
        }

        Ok(Self {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.map(str::to_string),
            total_copies: copies,
            available_copies: copies,
        })
    }

    /// The isbn as it was entered
    #[must_use]
    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    #[must_use]
    pub fn total_copies(&self) -> u32 {
        self.total_copies
    }

    #[must_use]
    pub fn available_copies(&self) -> u32 {
        self.available_copies
    }

    /// Whether at least one copy is on the shelf
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// Catalog key for an isbn: trimmed and lowercased
    #[must_use]
    pub fn normalize_isbn(isbn: &str) -> String {
        isbn.trim().to_lowercase()
    }

    /// Take one copy off the shelf
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::PolicyViolation` when no copy is available.
    pub(crate) fn check_out_copy(&mut self) -> LibraryResult<()> {
        self.available_copies = self.available_copies.checked_sub(1).ok_or_else(|| {
            LibraryError::PolicyViolation(format!(
                "\"{}\" is currently not available.",
                self.title
            ))
        })?;
        Ok(())
    }

    /// Put one copy back on the shelf
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::PolicyViolation` if every copy is already on
    /// the shelf, which means the ledger and catalog disagree.
    pub(crate) fn check_in_copy(&mut self) -> LibraryResult<()> {
        if self.available_copies >= self.total_copies {
            return Err(LibraryError::PolicyViolation(format!(
                "All copies of \"{}\" are already on the shelf.",
                self.title
            )));
        }
        self.available_copies = self.available_copies.saturating_add(1);
        Ok(())
    }

    /// Check the copy-count invariant on a book read from outside
    pub(crate) fn is_consistent(&self) -> bool {
        self.total_copies > 0
            && self.available_copies <= self.total_copies
            && !self.isbn.trim().is_empty()
            && !self.title.trim().is_empty()
    }
}
