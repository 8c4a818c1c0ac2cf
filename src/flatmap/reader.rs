//! Flat Map Reader
//!
//! Read-only mapping of a flat map file with zero-copy iteration.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::debug;

use crate::error::{DictError, IoResultExt, Result};

use super::{FileHeader, StringRef, HEADER_SIZE, MAGIC, RECORD_SIZE, STRING_REF_SIZE};

/// Memory-mapped flat map
///
/// Opening validates the header and every record, so later accesses can index
/// the mapping without further bounds failures. Strings are checked for UTF-8
/// only when they are decoded.
#[derive(Debug)]
pub struct MmapStringMap {
    map: Mmap,
    header: FileHeader,
    path: PathBuf,
}

impl MmapStringMap {
    /// Map `path` read-only and validate its layout
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_path(path)?;
        let file_size = file.metadata().with_path(path)?.len();

        if file_size < HEADER_SIZE as u64 {
            return Err(corrupted(
                path,
                format!("file is {} bytes, header needs {}", file_size, HEADER_SIZE),
            ));
        }

        // SAFETY: read-only mapping of a file that is replaced by rename, never
        // rewritten in place.
        let map = unsafe { Mmap::map(&file) }.with_path(path)?;

        let header = FileHeader::decode(&map[..HEADER_SIZE]);
        if header.magic != MAGIC {
            return Err(DictError::BadMagic {
                path: path.to_path_buf(),
                expected: MAGIC,
                actual: header.magic,
            });
        }

        let reader = Self {
            map,
            header,
            path: path.to_path_buf(),
        };
        reader.validate(file_size)?;

        debug!(path = %path.display(), entries = header.count, "mapped flat map");
        Ok(reader)
    }

    fn validate(&self, file_size: u64) -> Result<()> {
        let header = &self.header;
        let records_end = header
            .count
            .checked_mul(RECORD_SIZE as u64)
            .and_then(|n| n.checked_add(HEADER_SIZE as u64))
            .ok_or_else(|| corrupted(&self.path, format!("record count {} overflows", header.count)))?;

        if records_end > header.strings_offset {
            return Err(corrupted(
                &self.path,
                format!(
                    "{} records end at {} but strings start at {}",
                    header.count, records_end, header.strings_offset
                ),
            ));
        }

        header
            .strings_offset
            .checked_add(header.strings_size)
            .filter(|end| *end <= file_size)
            .ok_or_else(|| {
                corrupted(
                    &self.path,
                    format!(
                        "string pool at {}+{} exceeds file size {}",
                        header.strings_offset, header.strings_size, file_size
                    ),
                )
            })?;

        for i in 0..self.len() {
            let (key, value) = self.record(i);
            for s in [key, value] {
                let end = s.offset.checked_add(u64::from(s.length));
                if end.map_or(true, |end| end > header.strings_size) {
                    return Err(corrupted(
                        &self.path,
                        format!(
                            "record {} points at {}+{} beyond string pool of {} bytes",
                            i, s.offset, s.length, header.strings_size
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.header.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the mapped file in bytes
    pub fn mapped_size(&self) -> usize {
        self.map.len()
    }

    /// Iterate over raw `(key, value)` bytes straight from the mapping
    pub fn iter_raw(&self) -> impl Iterator<Item = (&[u8], &[u8])> + '_ {
        (0..self.len()).map(move |i| {
            let (key, value) = self.record(i);
            (self.bytes(key), self.bytes(value))
        })
    }

    /// Iterate over decoded `(key, value)` pairs without copying
    pub fn iter(&self) -> MmapStringMapIter<'_> {
        MmapStringMapIter {
            reader: self,
            next: 0,
        }
    }

    /// Linear scan for `key`
    pub fn get(&self, key: &str) -> Result<Option<&str>> {
        for (k, v) in self.iter_raw() {
            if k == key.as_bytes() {
                return self.decode(v).map(Some);
            }
        }
        Ok(None)
    }

    /// Materialize every entry into an owned map
    pub fn to_map(&self) -> Result<BTreeMap<String, String>> {
        self.iter()
            .map(|entry| entry.map(|(k, v)| (k.to_string(), v.to_string())))
            .collect()
    }

    pub(crate) fn decode<'a>(&'a self, raw: &'a [u8]) -> Result<&'a str> {
        std::str::from_utf8(raw)
            .map_err(|_| corrupted(&self.path, "string pool holds invalid UTF-8".to_string()))
    }

    fn record(&self, i: usize) -> (StringRef, StringRef) {
        let start = HEADER_SIZE + i * RECORD_SIZE;
        let record = &self.map[start..start + RECORD_SIZE];
        (
            StringRef::decode(&record[..STRING_REF_SIZE]),
            StringRef::decode(&record[STRING_REF_SIZE..]),
        )
    }

    fn bytes(&self, s: StringRef) -> &[u8] {
        let pool = self.header.strings_offset as usize;
        &self.map[pool + s.offset as usize..pool + s.end() as usize]
    }
}

/// Iterator over decoded flat map entries, in file order
pub struct MmapStringMapIter<'a> {
    reader: &'a MmapStringMap,
    next: usize,
}

impl<'a> Iterator for MmapStringMapIter<'a> {
    type Item = Result<(&'a str, &'a str)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.reader.len() {
            return None;
        }
        let (key, value) = self.reader.record(self.next);
        self.next += 1;

        let key = match self.reader.decode(self.reader.bytes(key)) {
            Ok(k) => k,
            Err(e) => return Some(Err(e)),
        };
        let value = match self.reader.decode(self.reader.bytes(value)) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        Some(Ok((key, value)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.reader.len() - self.next;
        (left, Some(left))
    }
}

fn corrupted(path: &Path, reason: String) -> DictError {
    DictError::Corrupted {
        path: path.to_path_buf(),
        reason,
    }
}
