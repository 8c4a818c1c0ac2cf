//! Flat Map Module
//!
//! Baseline dictionary: a flat table of string references memory-mapped for
//! reads. It is built once, never mutated, and searched linearly. It exists to
//! measure what the trie buys, and for environments without a trie dependency.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Header (32 bytes)                                           │
//! │   Magic: u64 | Count: u64 | StringsOffset: u64 |            │
//! │   StringsSize: u64                                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Records (32 bytes each, Count of them)                      │
//! │   Key:   Offset: u64 | Length: u32 | Padding: u32           │
//! │   Value: Offset: u64 | Length: u32 | Padding: u32           │
//! ├─────────────────────────────────────────────────────────────┤
//! │ String Pool (StringsSize bytes, starts at StringsOffset)    │
//! │   key bytes, value bytes, ... (offsets relative to pool)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//! Little-endian throughout. The magic has no version companion; a layout
//! change needs a new magic.

mod dictionary;
mod reader;
mod writer;

pub use dictionary::FlatMapDictionary;
pub use reader::{MmapStringMap, MmapStringMapIter};
pub use writer::write_flat_map;

// =============================================================================
// Shared Constants (used by writer and reader)
// =============================================================================

/// "MAPSTRIN"
pub const MAGIC: u64 = 0x4D4150535452494E;

/// Header: Magic (8) + Count (8) + StringsOffset (8) + StringsSize (8)
pub(crate) const HEADER_SIZE: usize = 32;

/// StringRef: Offset (8) + Length (4) + Padding (4)
pub(crate) const STRING_REF_SIZE: usize = 16;

/// One key/value record
pub(crate) const RECORD_SIZE: usize = 2 * STRING_REF_SIZE;

// =============================================================================
// Layout Structs
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FileHeader {
    pub magic: u64,
    pub count: u64,
    pub strings_offset: u64,
    pub strings_size: u64,
}

impl FileHeader {
    pub(crate) fn encode(&self, out: &mut [u8]) {
        out[0..8].copy_from_slice(&self.magic.to_le_bytes());
        out[8..16].copy_from_slice(&self.count.to_le_bytes());
        out[16..24].copy_from_slice(&self.strings_offset.to_le_bytes());
        out[24..32].copy_from_slice(&self.strings_size.to_le_bytes());
    }

    pub(crate) fn decode(data: &[u8]) -> Self {
        Self {
            magic: read_u64(data, 0),
            count: read_u64(data, 8),
            strings_offset: read_u64(data, 16),
            strings_size: read_u64(data, 24),
        }
    }
}

/// Location of one string inside the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StringRef {
    pub offset: u64,
    pub length: u32,
}

impl StringRef {
    pub(crate) fn encode(&self, out: &mut [u8]) {
        out[0..8].copy_from_slice(&self.offset.to_le_bytes());
        out[8..12].copy_from_slice(&self.length.to_le_bytes());
        out[12..16].fill(0);
    }

    pub(crate) fn decode(data: &[u8]) -> Self {
        Self {
            offset: read_u64(data, 0),
            length: u32::from_le_bytes([data[8], data[9], data[10], data[11]]),
        }
    }

    pub(crate) fn end(&self) -> u64 {
        self.offset + self.length as u64
    }
}

fn read_u64(data: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[at..at + 8]);
    u64::from_le_bytes(buf)
}
