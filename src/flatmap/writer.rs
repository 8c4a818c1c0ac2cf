//! Flat Map Writer
//!
//! Writes a key/value set straight into a read-write mapping of the output.

use std::path::Path;

use memmap2::MmapMut;
use tracing::debug;

use crate::error::{DictError, IoResultExt, Result};
use crate::io::ScopedTempFile;

use super::{FileHeader, StringRef, HEADER_SIZE, MAGIC, RECORD_SIZE, STRING_REF_SIZE};

/// Write `entries` to `path` in the flat map format.
///
/// The total size is computed up front so the file can be created at its final
/// length and filled through the mapping, without an intermediate buffer.
/// Returns the number of bytes written.
pub fn write_flat_map<'a, I>(path: &Path, entries: I) -> Result<u64>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
    I::IntoIter: Clone,
{
    let entries = entries.into_iter();

    // Pass 1: sizes
    let mut count = 0u64;
    let mut strings_size = 0u64;
    for (key, value) in entries.clone() {
        check_length(key)?;
        check_length(value)?;
        count += 1;
        strings_size += (key.len() + value.len()) as u64;
    }

    let strings_offset = HEADER_SIZE as u64 + count * RECORD_SIZE as u64;
    let total_size = strings_offset + strings_size;

    let temp = ScopedTempFile::beside(path)?;
    temp.as_file().set_len(total_size).with_path(temp.path())?;

    {
        // SAFETY: the temp file was just created by us and nothing else maps it.
        let mut map = unsafe { MmapMut::map_mut(temp.as_file()) }.with_path(temp.path())?;

        FileHeader {
            magic: MAGIC,
            count,
            strings_offset,
            strings_size,
        }
        .encode(&mut map[..HEADER_SIZE]);

        // Pass 2: records and strings
        let (records, strings) = map[HEADER_SIZE..].split_at_mut(strings_offset as usize - HEADER_SIZE);
        let mut cursor = 0usize;
        for (record, (key, value)) in records.chunks_exact_mut(RECORD_SIZE).zip(entries) {
            let key_ref = place(strings, &mut cursor, key);
            let value_ref = place(strings, &mut cursor, value);
            key_ref.encode(&mut record[..STRING_REF_SIZE]);
            value_ref.encode(&mut record[STRING_REF_SIZE..]);
        }

        map.flush().with_path(temp.path())?;
    }

    temp.persist()?;
    debug!(path = %path.display(), entries = count, bytes = total_size, "wrote flat map");
    Ok(total_size)
}

/// Copy `s` into the pool at `cursor` and return where it landed
fn place(pool: &mut [u8], cursor: &mut usize, s: &str) -> StringRef {
    let start = *cursor;
    pool[start..start + s.len()].copy_from_slice(s.as_bytes());
    *cursor += s.len();
    StringRef {
        offset: start as u64,
        length: s.len() as u32,
    }
}

fn check_length(s: &str) -> Result<()> {
    if s.len() > u32::MAX as usize {
        return Err(DictError::Config(format!(
            "string of {} bytes exceeds the flat map limit of {} bytes",
            s.len(),
            u32::MAX
        )));
    }
    Ok(())
}
