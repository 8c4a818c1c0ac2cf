//! Text Parser
//!
//! Line-by-line parsing with duplicate-key resolution.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::config::{OnDuplicatedKey, ParseOptions};
use crate::error::{DictError, IoResultExt, Result};

/// Parse a dictionary text file into an ordered map
pub fn parse_text_file(path: &Path, options: &ParseOptions) -> Result<BTreeMap<String, String>> {
    let file = File::open(path).with_path(path)?;
    let map = parse_lines(BufReader::new(file), options, path)?;
    debug!(path = %path.display(), entries = map.len(), "parsed text dictionary");
    Ok(map)
}

/// Parse dictionary text from any buffered reader
pub fn parse_reader<R: BufRead>(reader: R, options: &ParseOptions) -> Result<BTreeMap<String, String>> {
    parse_lines(reader, options, Path::new("<reader>"))
}

/// Split a stored value back into its concatenated components.
///
/// The whole separator string is the boundary and empty pieces are dropped.
/// An empty separator leaves the value intact.
pub fn split_values<'a>(value: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return vec![value];
    }
    value
        .split(separator)
        .filter(|piece| !piece.is_empty())
        .collect()
}

fn parse_lines<R: BufRead>(
    mut reader: R,
    options: &ParseOptions,
    origin: &Path,
) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    let mut buf = Vec::new();
    let mut line_no = 0usize;
    let limit = options.line_limit();

    loop {
        if limit.is_some_and(|max| line_no >= max) {
            break;
        }

        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).with_path(origin)?;
        if read == 0 {
            break;
        }
        line_no += 1;

        if buf.last() == Some(&b'\n') {
            buf.pop();
        }

        let line = std::str::from_utf8(&buf).map_err(|_| DictError::Encoding {
            path: origin.to_path_buf(),
            line: line_no,
        })?;

        if let Some((key, value)) = parse_line(line, options) {
            insert_entry(&mut map, key, value, options);
        }
    }

    Ok(map)
}

/// Turn one line into a `(key, value)` pair, or None if it is skipped
fn parse_line(line: &str, options: &ParseOptions) -> Option<(String, String)> {
    if !options.comment.is_empty() && line.starts_with(options.comment.as_str()) {
        return None;
    }

    let stripped;
    let line = if options.chars_to_remove.is_empty() {
        line
    } else {
        stripped = remove_chars(line, &options.chars_to_remove);
        stripped.as_str()
    };

    if options.delimiter.is_empty() {
        return None;
    }
    let (left, right) = line.split_once(options.delimiter.as_str())?;

    let (key, value) = if options.is_reversed {
        (right, left)
    } else {
        (left, right)
    };
    Some((key.to_string(), value.to_string()))
}

fn insert_entry(
    map: &mut BTreeMap<String, String>,
    key: String,
    value: String,
    options: &ParseOptions,
) {
    match map.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(value);
        }
        Entry::Occupied(mut slot) => match options.on_duplicated_key {
            OnDuplicatedKey::Overwrite => {
                slot.insert(value);
            }
            OnDuplicatedKey::Skip => {}
            OnDuplicatedKey::Concat => {
                let existing = slot.get_mut();
                existing.push_str(&options.concat_separator);
                existing.push_str(&value);
            }
        },
    }
}

fn remove_chars(line: &str, chars: &str) -> String {
    line.chars().filter(|c| !chars.contains(*c)).collect()
}
