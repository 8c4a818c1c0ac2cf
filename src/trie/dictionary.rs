//! Trie Dictionary
//!
//! Build, persist and query the trie-backed dictionary.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fst::automaton::{Automaton, Str};
use fst::{IntoStreamer, Map, MapBuilder, Streamer};
use memmap2::Mmap;
use tracing::debug;

use crate::config::ParseOptions;
use crate::dict::{is_reserved_key, push_matches, Backend, Dictionary, PrefixMatch, CONCAT_SEPARATOR_KEY};
use crate::error::{DictError, IoResultExt, Result};
use crate::io::framing::{self, LEN_SIZE};
use crate::io::{FrameReader, ScopedTempFile, SliceCursor, Span};
use crate::text::parse_text_file;

use super::table::{TrieBytes, ValueTable};

/// Dictionary backed by a compressed trie and an id-indexed value table
///
/// ## Concurrency
/// Once loaded the dictionary is immutable; `find` and `prefix_search` take
/// `&self` and can run from many threads at once (the type is `Send + Sync`).
#[derive(Default)]
pub struct TrieDictionary {
    index: Option<TrieIndex>,
}

/// Everything a loaded trie needs to answer queries
struct TrieIndex {
    trie: Map<TrieBytes>,
    values: ValueTable,
    /// Empty when values were not concatenated
    separator: String,
    /// File the index was loaded from (for error messages)
    origin: Option<PathBuf>,
}

impl TrieDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Building
    // =========================================================================

    /// Build from key/value pairs; later duplicates overwrite earlier ones
    pub fn build<I, K, V>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: BTreeMap<String, String> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.build_from_map(map, None)
    }

    /// Build from an already resolved map, remembering `separator` if given
    fn build_from_map(
        &mut self,
        mut map: BTreeMap<String, String>,
        separator: Option<&str>,
    ) -> Result<()> {
        if let Some(sep) = separator {
            map.insert(CONCAT_SEPARATOR_KEY.to_string(), sep.to_string());
        }

        // Phase 1: keys go in sorted order, each one tagged with its rank as id.
        let mut builder = MapBuilder::memory();
        for (id, key) in map.keys().enumerate() {
            builder.insert(key, id as u64)?;
        }
        let trie = Map::new(TrieBytes::Owned(builder.into_inner()?))?;

        // Phase 2: place every value at the id the finished trie reports.
        let mut values = vec![String::new(); map.len()];
        for (key, value) in map {
            let id = trie.get(&key).ok_or_else(|| {
                DictError::Corrupted {
                    path: PathBuf::from("<memory>"),
                    reason: format!("key {:?} missing from freshly built trie", key),
                }
            })? as usize;
            values[id] = value;
        }

        debug!(keys = values.len(), trie_bytes = trie.as_fst().size(), "built trie");

        self.index = Some(TrieIndex {
            trie,
            values: ValueTable::Owned(values),
            separator: separator.unwrap_or_default().to_string(),
            origin: None,
        });
        Ok(())
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load by reading the whole file into owned buffers
    pub fn load_binary_file_streaming(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path).with_path(path)?;
        let len = file.metadata().with_path(path)?.len();
        let mut reader = FrameReader::new(BufReader::new(file), len);

        let raw_values = reader.read_vec().map_err(|e| e.in_file(path))?;
        let trie_bytes = reader.read_sized().map_err(|e| e.in_file(path))?;
        check_trailing(reader.remaining(), path)?;

        let values = raw_values
            .into_iter()
            .enumerate()
            .map(|(id, raw)| {
                String::from_utf8(raw).map_err(|_| DictError::Corrupted {
                    path: path.to_path_buf(),
                    reason: format!("value {} is not valid UTF-8", id),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let trie = Map::new(TrieBytes::Owned(trie_bytes))
            .map_err(|e| DictError::from(e).in_file(path))?;
        self.install(trie, ValueTable::Owned(values), path)
    }

    /// Load by memory-mapping the file; nothing is copied out of the mapping
    fn load_mapped(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path).with_path(path)?;
        let len = file.metadata().with_path(path)?.len();
        if len < 2 * LEN_SIZE {
            return Err(DictError::Corrupted {
                path: path.to_path_buf(),
                reason: format!("file is {} bytes, smaller than the two section headers", len),
            });
        }

        // SAFETY: the mapping is read-only and dictionary files are never
        // modified in place; saves write a temp file and rename it.
        let map = Arc::new(unsafe { Mmap::map(&file) }.with_path(path)?);

        let mut cursor = SliceCursor::new(&map);
        let spans = read_value_spans(&mut cursor).map_err(|e| e.in_file(path))?;
        let trie_span = cursor.read_sized_span().map_err(|e| e.in_file(path))?;
        check_trailing(cursor.remaining(), path)?;

        let trie = Map::new(TrieBytes::mapped(Arc::clone(&map), trie_span))
            .map_err(|e| DictError::from(e).in_file(path))?;
        self.install(trie, ValueTable::Mapped { map, spans }, path)
    }

    /// Validate a freshly loaded trie/table pair and make it current
    fn install(&mut self, trie: Map<TrieBytes>, values: ValueTable, path: &Path) -> Result<()> {
        if trie.len() != values.len() {
            return Err(DictError::Corrupted {
                path: path.to_path_buf(),
                reason: format!(
                    "value table has {} entries but trie holds {} keys",
                    values.len(),
                    trie.len()
                ),
            });
        }

        let mut index = TrieIndex {
            trie,
            values,
            separator: String::new(),
            origin: Some(path.to_path_buf()),
        };
        index.separator = index
            .lookup(CONCAT_SEPARATOR_KEY.as_bytes())?
            .map(str::to_string)
            .unwrap_or_default();

        debug!(
            path = %path.display(),
            keys = index.values.len(),
            mapped = index.values.is_mapped(),
            "loaded trie dictionary"
        );
        self.index = Some(index);
        Ok(())
    }

    // =========================================================================
    // Saving
    // =========================================================================

    fn save(&self, path: &Path) -> Result<()> {
        let index = self.loaded()?;
        let trie_bytes = index.trie.as_fst().as_bytes();

        let mut temp = ScopedTempFile::beside(path)?;
        {
            let mut out = BufWriter::new(temp.as_file_mut());
            framing::write_vec(&mut out, index.values.len(), index.values.iter_raw())?;
            framing::write_sized(&mut out, trie_bytes)?;
            out.flush()?;
        }
        temp.persist()?;

        debug!(
            path = %path.display(),
            keys = index.values.len(),
            trie_bytes = trie_bytes.len(),
            "saved trie dictionary"
        );
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Zero-copy lookup; the returned value borrows from the dictionary
    pub fn find_str(&self, key: &str) -> Result<Option<&str>> {
        let index = self.loaded()?;
        if is_reserved_key(key.as_bytes()) {
            return Ok(None);
        }
        index.lookup(key.as_bytes())
    }

    /// Whether the trie knows `key`, without touching the value table
    pub fn contains(&self, key: &str) -> bool {
        match &self.index {
            Some(index) => !is_reserved_key(key.as_bytes()) && index.trie.contains_key(key),
            None => false,
        }
    }

    /// Number of user entries (the reserved separator key is not counted)
    pub fn len(&self) -> usize {
        match &self.index {
            Some(index) => {
                let reserved = index.trie.contains_key(CONCAT_SEPARATOR_KEY) as usize;
                index.trie.len() - reserved
            }
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    /// Whether reads are served from a memory mapping
    pub fn is_mapped(&self) -> bool {
        self.index.as_ref().is_some_and(|i| i.values.is_mapped())
    }

    /// Separator used to split values in prefix search (empty if none)
    pub fn concat_separator(&self) -> Option<&str> {
        self.index.as_ref().map(|i| i.separator.as_str())
    }

    fn loaded(&self) -> Result<&TrieIndex> {
        self.index.as_ref().ok_or_else(|| DictError::not_loaded("trie dictionary"))
    }
}

/// Locate every value of the table section without copying any of them
fn read_value_spans(cursor: &mut SliceCursor<'_>) -> Result<Vec<Span>> {
    let count = cursor.read_u64()?;
    // Each value needs at least its length field.
    let minimum = count.saturating_mul(LEN_SIZE);
    if minimum > cursor.remaining() {
        return Err(DictError::Truncated {
            offset: cursor.position(),
            needed: minimum,
            available: cursor.remaining(),
        });
    }
    let mut spans = Vec::with_capacity(count as usize);
    for _ in 0..count {
        spans.push(cursor.read_sized_span()?);
    }
    Ok(spans)
}

fn check_trailing(remaining: u64, path: &Path) -> Result<()> {
    if remaining != 0 {
        return Err(DictError::Corrupted {
            path: path.to_path_buf(),
            reason: format!("{} trailing bytes after trie blob", remaining),
        });
    }
    Ok(())
}

impl TrieIndex {
    fn lookup(&self, key: &[u8]) -> Result<Option<&str>> {
        let id = match self.trie.get(key) {
            Some(id) => id as usize,
            None => return Ok(None),
        };
        match self.values.raw(id) {
            Some(raw) => self.decode(raw, "value").map(Some),
            None => Ok(None),
        }
    }

    fn decode<'a>(&self, raw: &'a [u8], what: &str) -> Result<&'a str> {
        std::str::from_utf8(raw).map_err(|_| DictError::Corrupted {
            path: self.origin.clone().unwrap_or_default(),
            reason: format!("{} is not valid UTF-8", what),
        })
    }

    fn prefix_search(&self, prefix: &str) -> Result<Vec<PrefixMatch>> {
        let mut results = Vec::new();
        let mut stream = self.trie.search(Str::new(prefix).starts_with()).into_stream();

        while let Some((key, id)) = stream.next() {
            if is_reserved_key(key) {
                continue;
            }
            let Some(raw) = self.values.raw(id as usize) else {
                continue;
            };
            let key = self.decode(key, "key")?;
            let value = self.decode(raw, "value")?;
            push_matches(&mut results, key, value, &self.separator);
        }
        Ok(results)
    }
}

impl Dictionary for TrieDictionary {
    fn load_text_file(&mut self, path: &Path, options: &ParseOptions) -> Result<()> {
        let map = parse_text_file(path, options)?;
        self.build_from_map(map, options.effective_separator())
    }

    fn load_binary_file(&mut self, path: &Path) -> Result<()> {
        self.load_mapped(path)
    }

    fn save_to_binary_file(&mut self, path: &Path) -> Result<()> {
        self.save(path)
    }

    fn find(&self, key: &str) -> Result<Option<String>> {
        Ok(self.find_str(key)?.map(str::to_string))
    }

    fn prefix_search(&self, prefix: &str) -> Result<Vec<PrefixMatch>> {
        self.loaded()?.prefix_search(prefix)
    }

    fn close(&mut self) {
        self.index = None;
    }

    fn backend(&self) -> Backend {
        Backend::Trie
    }
}
