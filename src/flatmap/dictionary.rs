//! Flat Map Dictionary
//!
//! `Dictionary` over the flat map format. Queries are linear scans.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::ParseOptions;
use crate::dict::{is_reserved_key, push_matches, Backend, Dictionary, PrefixMatch, CONCAT_SEPARATOR_KEY};
use crate::error::{DictError, Result};
use crate::text::parse_text_file;

use super::{write_flat_map, MmapStringMap};

/// Where the entries currently live
enum FlatState {
    Empty,
    /// Parsed from text, not yet saved
    Memory(BTreeMap<String, String>),
    Mapped(MmapStringMap),
}

/// Flat, memory-mapped baseline dictionary
pub struct FlatMapDictionary {
    state: FlatState,
    separator: String,
}

impl Default for FlatMapDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl FlatMapDictionary {
    pub fn new() -> Self {
        Self {
            state: FlatState::Empty,
            separator: String::new(),
        }
    }

    /// Number of user entries (the reserved separator key is not counted)
    pub fn len(&self) -> usize {
        match &self.state {
            FlatState::Empty => 0,
            FlatState::Memory(map) => map.len() - map.contains_key(CONCAT_SEPARATOR_KEY) as usize,
            FlatState::Mapped(reader) => reader.iter_raw().filter(|(k, _)| !is_reserved_key(k)).count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.state, FlatState::Mapped(_))
    }

    /// The underlying mapping, for zero-copy iteration
    pub fn mapping(&self) -> Option<&MmapStringMap> {
        match &self.state {
            FlatState::Mapped(reader) => Some(reader),
            _ => None,
        }
    }

    /// Copy every user entry into an owned map
    pub fn to_map(&self) -> Result<BTreeMap<String, String>> {
        let mut map = match &self.state {
            FlatState::Empty => return Err(DictError::not_loaded("flat map dictionary")),
            FlatState::Memory(map) => map.clone(),
            FlatState::Mapped(reader) => reader.to_map()?,
        };
        map.remove(CONCAT_SEPARATOR_KEY);
        Ok(map)
    }

    /// Lookup including reserved keys
    fn lookup(&self, key: &str) -> Result<Option<&str>> {
        match &self.state {
            FlatState::Empty => Err(DictError::not_loaded("flat map dictionary")),
            FlatState::Memory(map) => Ok(map.get(key).map(String::as_str)),
            FlatState::Mapped(reader) => reader.get(key),
        }
    }
}

impl Dictionary for FlatMapDictionary {
    fn load_text_file(&mut self, path: &Path, options: &ParseOptions) -> Result<()> {
        let mut map = parse_text_file(path, options)?;
        self.separator = match options.effective_separator() {
            Some(sep) => {
                map.insert(CONCAT_SEPARATOR_KEY.to_string(), sep.to_string());
                sep.to_string()
            }
            None => String::new(),
        };
        self.state = FlatState::Memory(map);
        Ok(())
    }

    fn load_binary_file(&mut self, path: &Path) -> Result<()> {
        let reader = MmapStringMap::open(path)?;
        let separator = reader
            .get(CONCAT_SEPARATOR_KEY)?
            .map(str::to_string)
            .unwrap_or_default();
        self.state = FlatState::Mapped(reader);
        self.separator = separator;
        Ok(())
    }

    fn save_to_binary_file(&mut self, path: &Path) -> Result<()> {
        match &self.state {
            FlatState::Empty => return Err(DictError::not_loaded("flat map dictionary")),
            FlatState::Memory(map) => {
                write_flat_map(path, map.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
            }
            FlatState::Mapped(reader) => {
                let entries = reader.iter().collect::<Result<Vec<_>>>()?;
                write_flat_map(path, entries.iter().copied())?;
            }
        }
        Ok(())
    }

    fn find(&self, key: &str) -> Result<Option<String>> {
        let value = self.lookup(key)?;
        if is_reserved_key(key.as_bytes()) {
            return Ok(None);
        }
        Ok(value.map(str::to_string))
    }

    fn prefix_search(&self, prefix: &str) -> Result<Vec<PrefixMatch>> {
        let mut results = Vec::new();
        match &self.state {
            FlatState::Empty => return Err(DictError::not_loaded("flat map dictionary")),
            FlatState::Memory(map) => {
                for (key, value) in map {
                    if key.starts_with(prefix) && !is_reserved_key(key.as_bytes()) {
                        push_matches(&mut results, key, value, &self.separator);
                    }
                }
            }
            FlatState::Mapped(reader) => {
                for (key, value) in reader.iter_raw() {
                    if !key.starts_with(prefix.as_bytes()) || is_reserved_key(key) {
                        continue;
                    }
                    let key = reader.decode(key)?;
                    let value = reader.decode(value)?;
                    push_matches(&mut results, key, value, &self.separator);
                }
            }
        }
        Ok(results)
    }

    fn close(&mut self) {
        self.state = FlatState::Empty;
        self.separator.clear();
    }

    fn backend(&self) -> Backend {
        Backend::FlatMap
    }
}
