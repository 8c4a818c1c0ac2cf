//! LevelDB Dictionary
//!
//! The dictionary contract on top of an embedded LSM store.
//!
//! ## Lifecycle
//! ```text
//!   load_text_file ──▶ (path + options remembered, nothing parsed)
//!          │
//!          ▼
//!   save_to_binary_file(dir) ──▶ parse ──▶ one WriteBatch ──▶ store open
//!                                (stale keys of an existing store deleted)
//!
//!   load_binary_file(dir) ──────────────────────────────────▶ store open
//!
//!   store open ──▶ find / prefix_search ──▶ close
//! ```
//! The concat separator is stored under the reserved key inside the same
//! keyspace, so a store directory is self-describing.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use rusty_leveldb::{LdbIterator, Options, Status, WriteBatch, DB};
use tracing::{debug, warn};

use crate::config::ParseOptions;
use crate::dict::{is_reserved_key, push_matches, Backend, Dictionary, PrefixMatch, CONCAT_SEPARATOR_KEY};
use crate::error::{DictError, Result};
use crate::text::parse_text_file;

/// Text file waiting to be written into a store
struct PendingText {
    path: PathBuf,
    options: ParseOptions,
}

/// An open store and where it lives
struct OpenStore {
    db: DB,
    path: PathBuf,
}

/// Dictionary backed by LevelDB
///
/// ## Concurrency
/// The store handle needs exclusive access even for reads, so it sits in a
/// `RefCell` and the dictionary is not `Sync`. Give each thread its own
/// dictionary (a store directory can only be opened by one at a time).
#[derive(Default)]
pub struct LevelDbDictionary {
    store: RefCell<Option<OpenStore>>,
    pending: Option<PendingText>,
    separator: String,
}

impl LevelDbDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.store.borrow().is_some()
    }

    /// Separator recovered from the store (empty if values were not concatenated)
    pub fn concat_separator(&self) -> &str {
        &self.separator
    }

    fn ensure_closed(&self) -> Result<()> {
        if let Some(open) = self.store.borrow().as_ref() {
            return Err(DictError::Misuse(format!(
                "LevelDB store already open at {}",
                open.path.display()
            )));
        }
        Ok(())
    }

    fn open_store(path: &Path, create: bool) -> Result<DB> {
        let mut options = Options::default();
        options.create_if_missing = create;
        options.error_if_exists = false;
        DB::open(path, options).map_err(|status| store_error(path, status))
    }

    /// Point lookup including reserved keys
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut store = self.store.borrow_mut();
        let open = store
            .as_mut()
            .ok_or_else(|| DictError::not_loaded("LevelDB store"))?;

        match open.db.get(key.as_bytes()) {
            Some(raw) => decode(raw.to_vec(), &open.path).map(Some),
            None => Ok(None),
        }
    }
}

impl Dictionary for LevelDbDictionary {
    fn load_text_file(&mut self, path: &Path, options: &ParseOptions) -> Result<()> {
        if let Some(previous) = &self.pending {
            warn!(
                previous = %previous.path.display(),
                path = %path.display(),
                "replacing text file that was never saved"
            );
        }
        self.pending = Some(PendingText {
            path: path.to_path_buf(),
            options: options.clone(),
        });
        Ok(())
    }

    fn load_binary_file(&mut self, path: &Path) -> Result<()> {
        self.ensure_closed()?;

        let db = Self::open_store(path, false)?;
        *self.store.get_mut() = Some(OpenStore {
            db,
            path: path.to_path_buf(),
        });
        self.separator = self.get(CONCAT_SEPARATOR_KEY)?.unwrap_or_default();

        debug!(path = %path.display(), separator = %self.separator, "opened LevelDB dictionary");
        Ok(())
    }

    fn save_to_binary_file(&mut self, path: &Path) -> Result<()> {
        let pending = self
            .pending
            .as_ref()
            .ok_or_else(|| DictError::Misuse("no text file loaded".to_string()))?;
        self.ensure_closed()?;

        let mut map = parse_text_file(&pending.path, &pending.options)?;
        let separator = pending.options.effective_separator().map(str::to_string);
        if let Some(sep) = &separator {
            map.insert(CONCAT_SEPARATOR_KEY.to_string(), sep.clone());
        }

        let mut db = Self::open_store(path, true)?;

        // Rebuilding over an existing store replaces its contents, reserved key included.
        let stale: Vec<Vec<u8>> = stored_keys(&mut db, path)?
            .into_iter()
            .filter(|key| std::str::from_utf8(key).map_or(true, |k| !map.contains_key(k)))
            .collect();

        let mut batch = WriteBatch::new();
        for key in &stale {
            batch.delete(key);
        }
        for (key, value) in &map {
            batch.put(key.as_bytes(), value.as_bytes());
        }
        db.write(batch, true).map_err(|status| store_error(path, status))?;

        debug!(
            path = %path.display(),
            entries = map.len(),
            removed = stale.len(),
            "populated LevelDB dictionary"
        );

        *self.store.get_mut() = Some(OpenStore {
            db,
            path: path.to_path_buf(),
        });
        self.separator = separator.unwrap_or_default();
        Ok(())
    }

    fn find(&self, key: &str) -> Result<Option<String>> {
        let value = self.get(key)?;
        if is_reserved_key(key.as_bytes()) {
            return Ok(None);
        }
        Ok(value)
    }

    fn prefix_search(&self, prefix: &str) -> Result<Vec<PrefixMatch>> {
        let mut store = self.store.borrow_mut();
        let open = store
            .as_mut()
            .ok_or_else(|| DictError::not_loaded("LevelDB store"))?;
        let path = open.path.clone();

        let mut iter = open.db.new_iter().map_err(|status| store_error(&path, status))?;
        iter.seek(prefix.as_bytes());

        let mut results = Vec::new();
        let (mut key, mut value) = (Vec::new(), Vec::new());
        while iter.current(&mut key, &mut value) {
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            if !is_reserved_key(&key) {
                let k = decode(key.clone(), &path)?;
                let v = decode(value.clone(), &path)?;
                push_matches(&mut results, &k, &v, &self.separator);
            }
            if !iter.advance() {
                break;
            }
        }
        Ok(results)
    }

    fn close(&mut self) {
        if let Some(open) = self.store.get_mut().take() {
            debug!(path = %open.path.display(), "closed LevelDB dictionary");
        }
    }

    fn backend(&self) -> Backend {
        Backend::LevelDb
    }
}

/// Every key currently in the store, in key order
fn stored_keys(db: &mut DB, path: &Path) -> Result<Vec<Vec<u8>>> {
    let mut iter = db.new_iter().map_err(|status| store_error(path, status))?;
    iter.seek(b"");

    let mut keys = Vec::new();
    let (mut key, mut value) = (Vec::new(), Vec::new());
    while iter.current(&mut key, &mut value) {
        keys.push(key.clone());
        if !iter.advance() {
            break;
        }
    }
    Ok(keys)
}

fn store_error(path: &Path, status: Status) -> DictError {
    DictError::Store {
        path: path.to_path_buf(),
        reason: status.to_string(),
    }
}

fn decode(raw: Vec<u8>, path: &Path) -> Result<String> {
    String::from_utf8(raw).map_err(|_| DictError::Corrupted {
        path: path.to_path_buf(),
        reason: "store holds a non UTF-8 entry".to_string(),
    })
}
