use std::{
    fs::{self, File},
    io::{Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    book::Book,
    error::{LibraryError, LibraryResult},
    events::JournalEntry,
    loan::Loan,
};

/// Snapshot layout version written by this crate
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable representation of the whole library
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LibrarySnapshot {
    /// Layout version, checked on load
    pub version: u32,
    /// Catalog contents
    pub books: Vec<Book>,
    /// Ledger contents, oldest first
    pub loans: Vec<Loan>,
    /// Recent activity, oldest first
    #[serde(default)]
    pub journal: Vec<JournalEntry>,
}

impl LibrarySnapshot {
    /// Write the snapshot as pretty JSON, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns a `LibraryError::Persistence` if:
    /// - The snapshot cannot be serialized to JSON
    /// - The file or its directory cannot be created
    /// - The data cannot be written to the file
    pub fn save_to_file(&self, path: &Path) -> LibraryResult<()> {
        let serialized = serde_json::to_string_pretty(self)
            .map_err(|e| LibraryError::Persistence(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LibraryError::Persistence(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        debug!(path = %path.display(), books = self.books.len(), loans = self.loans.len(), "saving snapshot");
        let mut file = File::create(path)
            .map_err(|e| LibraryError::Persistence(format!("Failed to create file: {e}")))?;
        file.write_all(serialized.as_bytes())
            .map_err(|e| LibraryError::Persistence(format!("Failed to write to file: {e}")))?;

        Ok(())
    }

    /// Read a snapshot written by [`LibrarySnapshot::save_to_file`]
    ///
    /// # Errors
    ///
    /// Returns a `LibraryError::Load` if:
    /// - The file does not exist or cannot be read
    /// - The JSON parsing fails
    /// - The snapshot was written with another layout version
    pub fn load_from_file(path: &Path) -> LibraryResult<Self> {
        if !path.exists() {
            return Err(LibraryError::Load(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let mut file = File::open(path)
            .map_err(|e| LibraryError::Load(format!("Failed to open file: {e}")))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| LibraryError::Load(format!("Failed to read file: {e}")))?;

        let snapshot: Self = serde_json::from_str(&contents)
            .map_err(|e| LibraryError::Load(format!("Failed to parse JSON: {e}")))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LibraryError::Load(format!(
                "Unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }

        debug!(path = %path.display(), books = snapshot.books.len(), "loaded snapshot");
        Ok(snapshot)
    }
}
