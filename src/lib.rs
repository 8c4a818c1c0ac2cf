//! # rimedict
//!
//! Static, prefix-searchable key-value dictionaries with three interchangeable
//! backends:
//! - a compressed trie with a zero-copy memory-mapped file format
//! - an embedded LevelDB store
//! - a flat memory-mapped table, kept as a baseline for comparison
//!
//! Dictionaries are built once (from a delimited text file or a saved binary)
//! and then only read.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │               Text File (key<TAB>value lines)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Text Ingestion                         │
//! │     (comments, char removal, reversal, duplicate keys)      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!              trait Dictionary
//!     ┌─────────────────┼──────────────────┐
//!     ▼                 ▼                  ▼
//! ┌─────────┐     ┌───────────┐     ┌────────────┐
//! │  Trie   │     │  FlatMap  │     │  LevelDB   │
//! │ (fst +  │     │  (mmap    │     │  (store    │
//! │  table) │     │  records) │     │  dir)      │
//! └────┬────┘     └─────┬─────┘     └─────┬──────┘
//!      │                │                 │
//!      ▼                ▼                 ▼
//!  single file     single file      store directory
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod io;
pub mod text;
pub mod dict;
pub mod trie;
pub mod flatmap;
pub mod leveldb;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{OnDuplicatedKey, ParseOptions};
pub use dict::{open_dictionary, Backend, Dictionary, PrefixMatch, CONCAT_SEPARATOR_KEY};
pub use error::{DictError, ErrorKind, Result};
pub use flatmap::FlatMapDictionary;
pub use leveldb::LevelDbDictionary;
pub use trie::TrieDictionary;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of rimedict
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
