//! Scoped temp files
//!
//! A temp file created next to its final destination. Dropping it removes the
//! file; `persist` renames it over the destination instead. Because the temp
//! file lives in the same directory, the rename never crosses filesystems.

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{DictError, IoResultExt, Result};

/// Temp file beside `target`, removed on drop unless persisted.
///
/// Not meant to be shared across threads; each save owns its own.
#[derive(Debug)]
pub struct ScopedTempFile {
    file: NamedTempFile,
    target: PathBuf,
}

impl ScopedTempFile {
    /// Create `<dir of target>/.<file name>.XXXXXX.temp`
    pub fn beside(target: &Path) -> Result<Self> {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dict".to_string());

        let file = tempfile::Builder::new()
            .prefix(&format!(".{}.", name))
            .suffix(".temp")
            .tempfile_in(dir)
            .with_path(target)?;

        Ok(Self {
            file,
            target: target.to_path_buf(),
        })
    }

    /// Path of the temp file itself
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Final destination
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn as_file(&self) -> &File {
        self.file.as_file()
    }

    pub fn as_file_mut(&mut self) -> &mut File {
        self.file.as_file_mut()
    }

    /// Sync to disk and rename over the destination
    pub fn persist(self) -> Result<()> {
        self.file.as_file().sync_all().with_path(self.file.path())?;
        let target = self.target;
        self.file
            .persist(&target)
            .map_err(|e| DictError::File {
                path: target.clone(),
                source: e.error,
            })?;
        debug!(path = %target.display(), "persisted temp file");
        Ok(())
    }
}
