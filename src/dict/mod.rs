//! Dictionary Module
//!
//! The contract every backend implements and the factory that picks one.
//!
//! ## Responsibilities
//! - Uniform load/save/query API over the trie, flat-map and LevelDB engines
//! - The reserved key that carries the concat separator through persistence
//! - Re-splitting concatenated values in prefix search results

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::ParseOptions;
use crate::error::{DictError, Result};
use crate::flatmap::FlatMapDictionary;
use crate::leveldb::LevelDbDictionary;
use crate::text::split_values;
use crate::trie::TrieDictionary;

/// Reserved key holding the concat separator used at build time.
///
/// It contains newlines, which the text parser can never produce inside a key,
/// so it cannot collide with dictionary data loaded from text.
pub const CONCAT_SEPARATOR_KEY: &str = "\n__rimedict_concat_separator__\n";

/// One row of a prefix search
pub type PrefixMatch = (String, String);

/// A static, prefix-searchable dictionary
///
/// ## Lifecycle
/// 1. Fill it: `load_text_file` (optionally followed by `save_to_binary_file`)
///    or `load_binary_file`
/// 2. Query it: `find` / `prefix_search`, as often as needed
/// 3. `close` (or drop) to release files, mappings and store handles
///
/// Queries on a dictionary with nothing loaded fail with a misuse error.
pub trait Dictionary {
    /// Parse a text file. Trie and flat-map dictionaries build immediately;
    /// LevelDB defers the parse to `save_to_binary_file`.
    fn load_text_file(&mut self, path: &Path, options: &ParseOptions) -> Result<()>;

    /// Open a previously saved file (or store directory)
    fn load_binary_file(&mut self, path: &Path) -> Result<()>;

    /// Persist the loaded data (or, for LevelDB, populate a new store)
    fn save_to_binary_file(&mut self, path: &Path) -> Result<()>;

    /// Exact lookup; the value may hold several separator-joined values
    fn find(&self, key: &str) -> Result<Option<String>>;

    /// Every stored key starting with `prefix`, one row per logical value
    fn prefix_search(&self, prefix: &str) -> Result<Vec<PrefixMatch>>;

    /// Release backend resources; calling it again is a no-op
    fn close(&mut self);

    fn backend(&self) -> Backend;
}

// =============================================================================
// Backend Selection
// =============================================================================

/// Available dictionary engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Trie,
    FlatMap,
    LevelDb,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Trie, Backend::FlatMap, Backend::LevelDb];

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Trie => "trie",
            Backend::FlatMap => "flatmap",
            Backend::LevelDb => "leveldb",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = DictError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trie" | "marisa" | "fst" => Ok(Backend::Trie),
            "flatmap" | "flat" | "map" | "mmap" => Ok(Backend::FlatMap),
            "leveldb" | "level" => Ok(Backend::LevelDb),
            other => Err(DictError::Config(format!("unknown backend: {}", other))),
        }
    }
}

/// Create an empty dictionary for the given backend
pub fn open_dictionary(backend: Backend) -> Box<dyn Dictionary> {
    match backend {
        Backend::Trie => Box::new(TrieDictionary::new()),
        Backend::FlatMap => Box::new(FlatMapDictionary::new()),
        Backend::LevelDb => Box::new(LevelDbDictionary::new()),
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

pub(crate) fn is_reserved_key(key: &[u8]) -> bool {
    key == CONCAT_SEPARATOR_KEY.as_bytes()
}

/// Append one row per logical value of `value`
pub(crate) fn push_matches(out: &mut Vec<PrefixMatch>, key: &str, value: &str, separator: &str) {
    for piece in split_values(value, separator) {
        out.push((key.to_string(), piece.to_string()));
    }
}
