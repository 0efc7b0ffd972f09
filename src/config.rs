//! Library configuration

use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{LibraryError, LibraryResult},
    policy::LendingPolicy,
};

/// Default location of the library data file
pub const DEFAULT_DATA_FILE: &str = "library.json";

/// Library configuration, usually read from a TOML file
///
/// ```toml
/// data_file = "library.json"
///
/// [policy]
/// loan_period_days = 14
/// max_open_loans = 5
/// daily_rate_cents = 50
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Snapshot file the CLI reads and writes
    pub data_file: PathBuf,

    /// Lending rules
    pub policy: LendingPolicy,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self { data_file: PathBuf::from(DEFAULT_DATA_FILE), policy: LendingPolicy::default() }
    }
}

impl LibraryConfig {
    /// Parse a TOML document; missing keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Load` for malformed TOML.
    pub fn from_toml(text: &str) -> LibraryResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| LibraryError::Load(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML config file
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Load` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> LibraryResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            LibraryError::Load(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_toml(&text)
    }

    /// Reject rules no library could lend under
    fn validate(&self) -> LibraryResult<()> {
        if self.policy.max_open_loans == 0 {
            return Err(LibraryError::Load("policy.max_open_loans must be at least 1".to_string()));
        }
        Ok(())
    }
}
