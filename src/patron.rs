use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, LibraryResult};

/// Number of digits on a library card
pub const PATRON_ID_LEN: usize = 6;

/// A library card number: exactly six ASCII digits
///
/// Patrons are not stored on their own; the id is only referenced by loans.
/// A `PatronId` can only be built through [`PatronId::parse`], so holding one
/// means the id is well formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatronId(String);

impl PatronId {
    /// Validate and wrap a raw card number
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Validation` unless `raw` is exactly six digits.
    pub fn parse(raw: &str) -> LibraryResult<Self> {
        if raw.len() == PATRON_ID_LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(LibraryError::Validation(format!(
                "Invalid patron ID {raw:?}. Must be exactly {PATRON_ID_LEN} digits."
            )))
        }
    }

    /// The card number as text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PatronId {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PatronId {
    type Error = LibraryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PatronId> for String {
    fn from(id: PatronId) -> Self {
        id.0
    }
}

impl fmt::Display for PatronId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
