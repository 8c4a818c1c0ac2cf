//! Tests for text ingestion
//!
//! These tests verify:
//! - Line splitting at the first delimiter
//! - Comment skipping and character removal
//! - Key/value reversal
//! - Duplicate key policies (Overwrite, Skip, Concat)
//! - Line limits and encoding errors

use std::io::Cursor;

use rimedict::text::{parse_reader, parse_text_file, split_values};
use rimedict::{DictError, ErrorKind, OnDuplicatedKey, ParseOptions};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn parse(text: &str, options: &ParseOptions) -> Vec<(String, String)> {
    parse_reader(Cursor::new(text.as_bytes()), options)
        .unwrap()
        .into_iter()
        .collect()
}

fn pair(k: &str, v: &str) -> (String, String) {
    (k.to_string(), v.to_string())
}

const DUPLICATES: &str = "k\ta\nk\tb\nk\tc\n";

// =============================================================================
// Line Handling Tests
// =============================================================================

#[test]
fn test_parse_basic_lines() {
    let entries = parse("apple\t1\nbanana\t2\n", &ParseOptions::default());
    assert_eq!(entries, vec![pair("apple", "1"), pair("banana", "2")]);
}

#[test]
fn test_last_line_without_newline() {
    let entries = parse("apple\t1\nbanana\t2", &ParseOptions::default());
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1], pair("banana", "2"));
}

#[test]
fn test_lines_without_delimiter_are_dropped() {
    let entries = parse("no delimiter here\n\nkey\tvalue\n", &ParseOptions::default());
    assert_eq!(entries, vec![pair("key", "value")]);
}

#[test]
fn test_comment_lines_are_skipped() {
    let text = "# header\tignored\nkey\tvalue\n#another\tcomment\n";
    let entries = parse(text, &ParseOptions::default());
    assert_eq!(entries, vec![pair("key", "value")]);
}

#[test]
fn test_custom_comment_prefix() {
    let options = ParseOptions::builder().comment("//").build();
    let entries = parse("// note\tx\n#kept\tyes\n", &options);
    assert_eq!(entries, vec![pair("#kept", "yes")]);
}

#[test]
fn test_empty_comment_disables_comment_handling() {
    let options = ParseOptions::builder().comment("").build();
    let entries = parse("#key\tvalue\n", &options);
    assert_eq!(entries, vec![pair("#key", "value")]);
}

#[test]
fn test_carriage_returns_are_removed() {
    let entries = parse("key\tvalue\r\nother\tthing\r\n", &ParseOptions::default());
    assert_eq!(entries, vec![pair("key", "value"), pair("other", "thing")]);
}

#[test]
fn test_chars_to_remove_apply_before_delimiter_search() {
    let options = ParseOptions::builder().chars_to_remove("'-").build();
    let entries = parse("ab'c\td-e-f\n", &options);
    assert_eq!(entries, vec![pair("abc", "def")]);
}

#[test]
fn test_no_trimming_is_performed() {
    let entries = parse(" key \t value \n", &ParseOptions::default());
    assert_eq!(entries, vec![pair(" key ", " value ")]);
}

#[test]
fn test_split_only_at_first_delimiter() {
    let entries = parse("key\tvalue\twith\ttabs\n", &ParseOptions::default());
    assert_eq!(entries, vec![pair("key", "value\twith\ttabs")]);
}

#[test]
fn test_multi_char_delimiter() {
    let options = ParseOptions::builder().delimiter("=>").build();
    let entries = parse("a=>b=>c\nplain=line\n", &options);
    assert_eq!(entries, vec![pair("a", "b=>c")]);
}

#[test]
fn test_reversed_lines_swap_key_and_value() {
    let options = ParseOptions::builder().reversed(true).build();
    let entries = parse("你好\tnihao\n世界\tshijie\n", &options);
    assert_eq!(entries, vec![pair("nihao", "你好"), pair("shijie", "世界")]);
}

#[test]
fn test_line_limit_stops_reading() {
    let options = ParseOptions::builder().lines(2).build();
    let entries = parse("a\t1\n# comment\nb\t2\nc\t3\n", &options);
    assert_eq!(entries, vec![pair("a", "1")]);
}

#[test]
fn test_zero_line_limit_reads_everything() {
    let options = ParseOptions::builder().lines(0).build();
    let entries = parse("a\t1\nb\t2\n", &options);
    assert_eq!(entries, vec![pair("a", "1"), pair("b", "2")]);
}

// =============================================================================
// Duplicate Key Tests
// =============================================================================

#[test]
fn test_duplicate_overwrite_keeps_last() {
    let options = ParseOptions::builder()
        .on_duplicated_key(OnDuplicatedKey::Overwrite)
        .build();
    assert_eq!(parse(DUPLICATES, &options), vec![pair("k", "c")]);
}

#[test]
fn test_duplicate_skip_keeps_first() {
    let options = ParseOptions::builder()
        .on_duplicated_key(OnDuplicatedKey::Skip)
        .build();
    assert_eq!(parse(DUPLICATES, &options), vec![pair("k", "a")]);
}

#[test]
fn test_duplicate_concat_joins_in_file_order() {
    let options = ParseOptions::builder().concat_with("|").build();
    assert_eq!(parse(DUPLICATES, &options), vec![pair("k", "a|b|c")]);
}

#[test]
fn test_duplicate_concat_uses_default_separator() {
    let options = ParseOptions::builder()
        .on_duplicated_key(OnDuplicatedKey::Concat)
        .build();
    assert_eq!(parse("k\tx\nk\ty\n", &options), vec![pair("k", "x$|$y")]);
}

#[test]
fn test_concat_only_affects_repeated_keys() {
    let options = ParseOptions::builder().concat_with("|").build();
    let entries = parse("a\t1\nb\t2\na\t3\n", &options);
    assert_eq!(entries, vec![pair("a", "1|3"), pair("b", "2")]);
}

// =============================================================================
// File Tests
// =============================================================================

#[test]
fn test_parse_text_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dict.txt");
    std::fs::write(&path, "hello\tworld\n").unwrap();

    let map = parse_text_file(&path, &ParseOptions::default()).unwrap();
    assert_eq!(map.get("hello").map(String::as_str), Some("world"));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = parse_text_file(&dir.path().join("missing.txt"), &ParseOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_invalid_utf8_reports_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.txt");
    std::fs::write(&path, b"ok\tfine\nbad\t\xff\xfe\n").unwrap();

    let err = parse_text_file(&path, &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, DictError::Encoding { line: 2, .. }));
    assert!(err.is_format());
}

// =============================================================================
// Value Splitting Tests
// =============================================================================

#[test]
fn test_split_values_on_whole_separator() {
    assert_eq!(split_values("a$|$b$|$c", "$|$"), vec!["a", "b", "c"]);
}

#[test]
fn test_split_values_keeps_partial_separator_chars() {
    assert_eq!(split_values("a$b|c", "$|$"), vec!["a$b|c"]);
}

#[test]
fn test_split_values_without_separator() {
    assert_eq!(split_values("a|b", ""), vec!["a|b"]);
}
