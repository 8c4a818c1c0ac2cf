//! Trie Module
//!
//! Dictionary backed by a compressed trie (`fst::Map`) plus an id → value
//! table. The trie maps every key to a dense id in `0..n`; the table holds the
//! value for each id.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Value Table                                              │
//! │   TableSize: u64                                         │
//! │   [ValueLen: u64][Value bytes]   ... repeated TableSize  │
//! ├──────────────────────────────────────────────────────────┤
//! │ Trie                                                     │
//! │   TrieBlobSize: u64                                      │
//! │   [fst map bytes]                                        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//! All integers are little-endian. There is no magic or version field; the
//! layout is fixed and any change needs a new file name or a leading magic.
//!
//! ## Loading
//! - `load_binary_file` maps the file and serves reads straight from the
//!   mapping: the table is indexed in place and the trie is opened over the
//!   mapped sub-slice.
//! - `load_binary_file_streaming` reads everything into owned buffers.

mod dictionary;
mod table;

pub use dictionary::TrieDictionary;
