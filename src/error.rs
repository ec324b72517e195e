//! Centralized error handling for douane-insight.
//!
//! Every fallible catalog or engine call returns [`Result<T>`], whose error
//! side is the [`DouaneError`] enum. The three kinds a dashboard has to tell
//! apart are:
//!
//! - [`DouaneError::NotFound`]: a category or year directory does not exist.
//! - [`DouaneError::Load`]: a period file is missing, unreadable, or not a table.
//! - [`DouaneError::Column`]: a view was asked for a column that is absent or of
//!   the wrong classification.
//!
//! ```
//! use douane_insight::error::DouaneError;
//!
//! fn banner(err: &DouaneError) -> String {
//!     match err {
//!         DouaneError::NotFound(what) => format!("Nothing here: {what}"),
//!         DouaneError::Column { column, .. } => format!("Cannot chart '{column}'"),
//!         other => other.to_string(),
//!     }
//! }
//! ```
//!
//! The `ResultExt` trait adds `.context()` to any result whose error converts
//! into a `DouaneError`:
//!
//! ```no_run
//! use douane_insight::error::ResultExt as _;
//!
//! fn read_settings() -> douane_insight::error::Result<String> {
//!     let raw = std::fs::read_to_string("douane.json").context("Failed to read settings")?;
//!     Ok(raw)
//! }
//! ```

use std::fmt;
use std::path::PathBuf;

/// Main error type for catalog and summarization operations.
#[derive(Debug)]
pub enum DouaneError {
    /// A category/year directory (or the data root itself) is missing.
    NotFound(String),

    /// A period file could not be read or decoded as a table.
    Load { path: PathBuf, reason: String },

    /// A column is absent or has the wrong classification for the view.
    Column { column: String, reason: String },

    /// A path component would escape the data root or is empty.
    InvalidPath(String),

    /// I/O errors outside of table loading (directory scans, writes).
    Io(std::io::Error),

    /// Polars failures while building or filtering frames.
    DataProcessing(String),

    /// Configuration errors
    Config(String),
}

impl DouaneError {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn column(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Column {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// True for the errors a dashboard should show as "no data" rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl fmt::Display for DouaneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "Not found: {what}"),
            Self::Load { path, reason } => {
                write!(f, "Failed to load {}: {reason}", path.display())
            }
            Self::Column { column, reason } => write!(f, "Column '{column}': {reason}"),
            Self::InvalidPath(msg) => write!(f, "Invalid path: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for DouaneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DouaneError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for DouaneError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for DouaneError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

// Dashboards usually surface errors as a plain warning banner.
impl From<DouaneError> for String {
    fn from(err: DouaneError) -> Self {
        err.to_string()
    }
}

/// Result type alias for douane-insight operations.
pub type Result<T> = std::result::Result<T, DouaneError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped with `msg`.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped with the closure's message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<DouaneError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| wrap(e.into(), msg.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| wrap(e.into(), f()))
    }
}

// Keeps the variant so callers can still match on the error kind.
fn wrap(err: DouaneError, msg: String) -> DouaneError {
    match err {
        DouaneError::NotFound(what) => DouaneError::NotFound(format!("{msg}: {what}")),
        DouaneError::Load { path, reason } => DouaneError::Load {
            path,
            reason: format!("{msg}: {reason}"),
        },
        DouaneError::Column { column, reason } => DouaneError::Column {
            column,
            reason: format!("{msg}: {reason}"),
        },
        DouaneError::InvalidPath(m) => DouaneError::InvalidPath(format!("{msg}: {m}")),
        DouaneError::Io(e) => {
            DouaneError::Io(std::io::Error::new(e.kind(), format!("{msg}: {e}")))
        }
        DouaneError::DataProcessing(m) => DouaneError::DataProcessing(format!("{msg}: {m}")),
        DouaneError::Config(m) => DouaneError::Config(format!("{msg}: {m}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DouaneError::column("TONNAGE", "not numeric");
        assert_eq!(err.to_string(), "Column 'TONNAGE': not numeric");
    }

    #[test]
    fn test_error_conversion_to_string() {
        let err = DouaneError::NotFound("category 'Textile'".to_owned());
        let s: String = err.into();
        assert_eq!(s, "Not found: category 'Textile'");
    }

    #[test]
    fn test_result_context_keeps_kind() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "01.xlsx",
        ));

        let result: Result<()> = result.context("Failed to read period file");
        match result {
            Err(DouaneError::Io(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
                assert!(e.to_string().contains("Failed to read period file"));
            }
            other => panic!("Expected an I/O error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_error_mentions_path() {
        let err = DouaneError::load("data/Bois/2021/03.xlsx", "not a zip archive");
        let text = err.to_string();
        assert!(text.contains("03.xlsx"), "Path should be in the message: {text}");
        assert!(text.contains("not a zip archive"));
    }
}
