use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    book::Book,
    error::{LibraryError, LibraryResult},
};

/// Which book field a search query is matched against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    /// Case-insensitive substring of the title
    #[default]
    Title,
    /// Case-insensitive substring of the author
    Author,
    /// Case-insensitive exact isbn
    Isbn,
}

impl FromStr for SearchField {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "isbn" => Ok(Self::Isbn),
            other => Err(LibraryError::Validation(format!(
                "Unknown search field {other:?}; expected title, author or isbn."
            ))),
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => f.write_str("title"),
            Self::Author => f.write_str("author"),
            Self::Isbn => f.write_str("isbn"),
        }
    }
}

/// Every book the library owns, keyed by normalized isbn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Books keyed by [`Book::normalize_isbn`]
    books: BTreeMap<String, Book>,
}

impl Catalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a catalog from stored books, re-checking every invariant
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Load` for a duplicate isbn or a book whose copy
    /// counts are out of range.
    pub fn from_books(books: Vec<Book>) -> LibraryResult<Self> {
        let mut catalog = Self::new();
        for book in books {
            if !book.is_consistent() {
                return Err(LibraryError::Load(format!(
                    "Inconsistent record for isbn {:?}",
                    book.isbn()
                )));
            }
            let key = Book::normalize_isbn(book.isbn());
            if catalog.books.contains_key(&key) {
                return Err(LibraryError::Load(format!("Duplicate isbn {:?}", book.isbn())));
            }
            catalog.books.insert(key, book);
        }
        Ok(catalog)
    }

    /// Add a book with no author
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Validation` for invalid fields or an isbn that
    /// is already in the catalog.
    pub fn add_book(&mut self, isbn: &str, title: &str, copies: u32) -> LibraryResult<&Book> {
        self.add_book_with_author(isbn, title, None, copies)
    }

    /// Add a book, optionally recording its author
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::add_book`].
    pub fn add_book_with_author(
        &mut self,
        isbn: &str,
        title: &str,
        author: Option<&str>,
        copies: u32,
    ) -> LibraryResult<&Book> {
        let book = Book::new(isbn, title, author, copies)?;
        let key = Book::normalize_isbn(book.isbn());
        if self.books.contains_key(&key) {
            return Err(LibraryError::Validation(format!(
                "A book with ISBN {} already exists.",
                book.isbn()
            )));
        }
        Ok(self.books.entry(key).or_insert(book))
    }

    /// All books ordered by title ignoring case, then by isbn
    #[must_use]
    pub fn list_books(&self) -> Vec<&Book> {
        let mut books: Vec<&Book> = self.books.values().collect();
        books.sort_by(|a, b| {
            a.title()
                .to_lowercase()
                .cmp(&b.title().to_lowercase())
                .then_with(|| a.isbn().cmp(b.isbn()))
        });
        books
    }

    /// The book with this isbn, ignoring case and surrounding whitespace
    #[must_use]
    pub fn get(&self, isbn: &str) -> Option<&Book> {
        self.books.get(&Book::normalize_isbn(isbn))
    }

    /// Mutable access for the lending operations
    pub(crate) fn get_mut(&mut self, isbn: &str) -> Option<&mut Book> {
        self.books.get_mut(&Book::normalize_isbn(isbn))
    }

    /// Exact isbn lookup as a result list: zero or one book
    #[must_use]
    pub fn find_by_isbn(&self, isbn: &str) -> Vec<&Book> {
        self.get(isbn).into_iter().collect()
    }

    #[must_use]
    pub fn find_by_title_substring(&self, query: &str) -> Vec<&Book> {
        self.search(SearchField::Title, query)
    }

    #[must_use]
    pub fn find_by_author_substring(&self, query: &str) -> Vec<&Book> {
        self.search(SearchField::Author, query)
    }

    /// Search one field; a blank query matches nothing
    #[must_use]
    pub fn search(&self, field: SearchField, query: &str) -> Vec<&Book> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        if field == SearchField::Isbn {
            return self.find_by_isbn(query);
        }

        let needle = query.to_lowercase();
        let results: Vec<&Book> = self
            .list_books()
            .into_iter()
            .filter(|book| {
                let haystack = match field {
                    SearchField::Author => book.author().unwrap_or_default(),
                    SearchField::Title | SearchField::Isbn => book.title(),
                };
                haystack.to_lowercase().contains(&needle)
            })
            .collect();
        debug!(%field, query, matches = results.len(), "catalog search");
        results
    }

    /// Number of distinct titles
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Books in key order, for snapshots
    pub(crate) fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }
}
