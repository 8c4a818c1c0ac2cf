//! Trie storage
//!
//! Byte storage for the trie blob and the id-indexed value table, either owned
//! or borrowed from a shared read-only mapping.

use std::sync::Arc;

use memmap2::Mmap;

use crate::io::Span;

/// Bytes backing the fst map
#[derive(Clone)]
pub(crate) enum TrieBytes {
    Owned(Vec<u8>),
    Mapped { map: Arc<Mmap>, start: usize, end: usize },
}

impl TrieBytes {
    pub(crate) fn mapped(map: Arc<Mmap>, span: Span) -> Self {
        let start = span.offset as usize;
        let end = span.end() as usize;
        TrieBytes::Mapped { map, start, end }
    }
}

impl AsRef<[u8]> for TrieBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            TrieBytes::Owned(bytes) => bytes,
            TrieBytes::Mapped { map, start, end } => &map[*start..*end],
        }
    }
}

/// Values indexed by trie id
pub(crate) enum ValueTable {
    Owned(Vec<String>),
    /// Spans into the mapping; values are decoded on access
    Mapped { map: Arc<Mmap>, spans: Vec<Span> },
}

impl ValueTable {
    pub(crate) fn len(&self) -> usize {
        match self {
            ValueTable::Owned(values) => values.len(),
            ValueTable::Mapped { spans, .. } => spans.len(),
        }
    }

    /// Raw value bytes for `id`, None when out of bounds
    pub(crate) fn raw(&self, id: usize) -> Option<&[u8]> {
        match self {
            ValueTable::Owned(values) => values.get(id).map(|v| v.as_bytes()),
            ValueTable::Mapped { map, spans } => spans.get(id)?.slice(map),
        }
    }

    pub(crate) fn iter_raw(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.len()).filter_map(move |id| self.raw(id))
    }

    pub(crate) fn is_mapped(&self) -> bool {
        matches!(self, ValueTable::Mapped { .. })
    }
}
