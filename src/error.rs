//! Error types for rimedict
//!
//! Provides a unified error type for all dictionary operations.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias using DictError
pub type Result<T> = std::result::Result<T, DictError>;

/// Coarse error category, used by callers that only care about what went wrong
/// at the contract level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A file, mapping or store could not be opened, created or written
    Io,
    /// Persisted data is malformed (bad magic, truncated, out-of-bounds lengths)
    Format,
    /// The caller broke the contract (save without load, double open, read while closed)
    Misuse,
    /// Invalid settings or input that cannot be represented
    Config,
}

/// Unified error type for rimedict operations
#[derive(Debug, Error)]
pub enum DictError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error on {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store error at {}: {reason}", path.display())]
    Store { path: PathBuf, reason: String },

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("invalid magic in {}: expected {expected:#018x}, found {actual:#018x}", path.display())]
    BadMagic {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("corrupted dictionary file {}: {reason}", path.display())]
    Corrupted { path: PathBuf, reason: String },

    #[error("unexpected end of data at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        offset: u64,
        needed: u64,
        available: u64,
    },

    #[error("invalid UTF-8 in {} at line {line}", path.display())]
    Encoding { path: PathBuf, line: usize },

    #[error("trie error: {0}")]
    Trie(#[from] fst::Error),

    // -------------------------------------------------------------------------
    // Contract Errors
    // -------------------------------------------------------------------------
    #[error("misuse: {0}")]
    Misuse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl DictError {
    /// Classify this error into one of the contract-level categories
    pub fn kind(&self) -> ErrorKind {
        match self {
            DictError::Io(_) | DictError::File { .. } | DictError::Store { .. } => ErrorKind::Io,
            DictError::BadMagic { .. }
            | DictError::Corrupted { .. }
            | DictError::Truncated { .. }
            | DictError::Encoding { .. }
            | DictError::Trie(_) => ErrorKind::Format,
            DictError::Misuse(_) => ErrorKind::Misuse,
            DictError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn is_format(&self) -> bool {
        self.kind() == ErrorKind::Format
    }

    pub fn is_misuse(&self) -> bool {
        self.kind() == ErrorKind::Misuse
    }

    /// Attach the file being processed to path-less errors.
    ///
    /// Framing helpers report `Truncated` and bare `Io` errors without knowing
    /// which file they read; engines upgrade them here.
    pub fn in_file(self, path: &Path) -> Self {
        match self {
            DictError::Truncated { .. } => DictError::Corrupted {
                path: path.to_path_buf(),
                reason: self.to_string(),
            },
            DictError::Io(source) if source.kind() == std::io::ErrorKind::UnexpectedEof => {
                DictError::Corrupted {
                    path: path.to_path_buf(),
                    reason: source.to_string(),
                }
            }
            DictError::Io(source) => DictError::File {
                path: path.to_path_buf(),
                source,
            },
            DictError::Trie(err) => DictError::Corrupted {
                path: path.to_path_buf(),
                reason: format!("invalid trie blob: {}", err),
            },
            other => other,
        }
    }

    pub(crate) fn not_loaded(what: &str) -> Self {
        DictError::Misuse(format!("{} not loaded", what))
    }
}

/// Extension to tag `io::Result` values with the path they concern
pub(crate) trait IoResultExt<T> {
    fn with_path(self, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: &Path) -> Result<T> {
        self.map_err(|source| DictError::File {
            path: path.to_path_buf(),
            source,
        })
    }
}
