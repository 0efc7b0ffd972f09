use thiserror::Error;

/// Errors returned by library operations
///
/// Every failed operation leaves the catalog and the ledger unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LibraryError {
    /// Malformed input: isbn, title, author, patron id or copy count
    #[error("Validation error: {0}")]
    Validation(String),
    /// Unknown isbn, or no loan matching the patron and book
    #[error("Not found: {0}")]
    NotFound(String),
    /// The request is well formed but the lending rules forbid it
    #[error("Policy violation: {0}")]
    PolicyViolation(String),
    /// Error occurred while saving state
    #[error("Persistence error: {0}")]
    Persistence(String),
    /// Error occurred while loading state or configuration
    #[error("Load error: {0}")]
    Load(String),
}

/// Result alias used throughout the crate
pub type LibraryResult<T> = Result<T, LibraryError>;
