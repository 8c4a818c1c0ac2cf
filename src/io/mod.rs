//! Binary I/O Module
//!
//! Shared building blocks for the on-disk formats.
//!
//! ## Framing
//! ```text
//! sized string:  [len: u64 LE][bytes ...]
//! string vector: [count: u64 LE][sized string] * count
//! ```
//!
//! Writers target any `io::Write`. Two readers exist: `FrameReader` for
//! buffered streams with a known remaining length, and `SliceCursor` for
//! bounds-checked reads straight out of a memory mapping.

pub mod framing;
mod temp_file;

pub use framing::{FrameReader, SliceCursor, Span};
pub use temp_file::ScopedTempFile;
