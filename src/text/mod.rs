//! Text Ingestion Module
//!
//! Turns delimited dictionary text files into an ordered key → value map.
//!
//! ## Line Processing
//! ```text
//!   raw line ──▶ comment? ──▶ strip chars ──▶ split at first delimiter
//!                  │ yes                            │ none
//!                  ▼                                ▼
//!                dropped                          dropped
//!
//!   (left, right) ──▶ reversed? swap ──▶ duplicate policy ──▶ map
//! ```
//!
//! Lines are never trimmed or normalized beyond `chars_to_remove`.

mod parser;

pub use parser::{parse_reader, parse_text_file, split_values};
