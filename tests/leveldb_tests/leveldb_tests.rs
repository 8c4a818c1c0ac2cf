//! Tests for the LevelDB dictionary
//!
//! These tests verify:
//! - Deferred text parsing and store population on save
//! - Reopening a populated store directory
//! - Concatenated values and the persisted separator
//! - Lifecycle misuse (save without text, double open, reads while closed)

#[path = "../common/mod.rs"]
mod common;

use common::{check_accord_dictionary, rows, sorted_rows, DictFixture};
use rimedict::{Dictionary, ErrorKind, LevelDbDictionary, ParseOptions, CONCAT_SEPARATOR_KEY};

// =============================================================================
// Helper Functions
// =============================================================================

fn populated(fixture: &DictFixture, name: &str) -> (LevelDbDictionary, std::path::PathBuf) {
    let dir = fixture.path(name);
    let mut dict = LevelDbDictionary::new();
    dict.load_text_file(&fixture.txt_path, &ParseOptions::default())
        .unwrap();
    dict.save_to_binary_file(&dir).unwrap();
    (dict, dir)
}

// =============================================================================
// Build Tests
// =============================================================================

#[test]
fn test_save_populates_and_opens_store() {
    let fixture = DictFixture::new();
    let (dict, dir) = populated(&fixture, "store");

    assert!(dict.is_open());
    assert!(dir.is_dir());
    check_accord_dictionary(&dict);
}

#[test]
fn test_text_is_parsed_lazily() {
    let fixture = DictFixture::new();
    let mut dict = LevelDbDictionary::new();

    // The text file is only read when the store is populated.
    dict.load_text_file(&fixture.path("not-yet.txt"), &ParseOptions::default())
        .unwrap();
    assert!(!dict.is_open());

    let err = dict.save_to_binary_file(&fixture.path("store")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!dict.is_open());
}

#[test]
fn test_reopen_after_close() {
    let fixture = DictFixture::new();
    let (mut dict, dir) = populated(&fixture, "store");
    dict.close();
    assert!(!dict.is_open());

    let mut reopened = LevelDbDictionary::new();
    reopened.load_binary_file(&dir).unwrap();
    check_accord_dictionary(&reopened);
    assert_eq!(reopened.concat_separator(), "");
}

#[test]
fn test_open_missing_store_fails() {
    let fixture = DictFixture::new();
    let mut dict = LevelDbDictionary::new();
    let err = dict.load_binary_file(&fixture.path("no-such-store")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!dict.is_open());
}

#[test]
fn test_prefix_search_stops_at_prefix_boundary() {
    let fixture = DictFixture::new();
    let source = fixture.write_text("words.txt", "ab\t1\nabc\t2\nabd\t3\nac\t4\nb\t5\n");
    let dir = fixture.path("store");

    let mut dict = LevelDbDictionary::new();
    dict.load_text_file(&source, &ParseOptions::default()).unwrap();
    dict.save_to_binary_file(&dir).unwrap();

    assert_eq!(
        dict.prefix_search("ab").unwrap(),
        rows(&[("ab", "1"), ("abc", "2"), ("abd", "3")])
    );
    assert_eq!(dict.prefix_search("b").unwrap(), rows(&[("b", "5")]));
    assert!(dict.prefix_search("c").unwrap().is_empty());
    assert_eq!(dict.prefix_search("").unwrap().len(), 5);
}

// =============================================================================
// Concat Tests
// =============================================================================

#[test]
fn test_concat_values_roundtrip_with_separator() {
    let fixture = DictFixture::new();
    let source = fixture.write_text("dup.txt", "key\tone\nkey\ttwo\nother\tx\n");
    let dir = fixture.path("store");
    let options = ParseOptions::builder().concat_with("/").build();

    let mut dict = LevelDbDictionary::new();
    dict.load_text_file(&source, &options).unwrap();
    dict.save_to_binary_file(&dir).unwrap();
    assert_eq!(dict.concat_separator(), "/");
    dict.close();

    let mut reopened = LevelDbDictionary::new();
    reopened.load_binary_file(&dir).unwrap();

    assert_eq!(reopened.concat_separator(), "/");
    assert_eq!(reopened.find("key").unwrap().as_deref(), Some("one/two"));
    assert_eq!(reopened.find(CONCAT_SEPARATOR_KEY).unwrap(), None);
    assert_eq!(
        sorted_rows(reopened.prefix_search("").unwrap()),
        rows(&[("key", "one"), ("key", "two"), ("other", "x")])
    );
}

#[test]
fn test_rebuild_without_concat_replaces_store() {
    let fixture = DictFixture::new();
    let concat_source = fixture.write_text("dup.txt", "k\tx\nk\ty\n");
    let plain_source = fixture.write_text("plain.txt", "m\tp|q\n");
    let dir = fixture.path("store");

    let mut dict = LevelDbDictionary::new();
    dict.load_text_file(&concat_source, &ParseOptions::builder().concat_with("|").build())
        .unwrap();
    dict.save_to_binary_file(&dir).unwrap();
    dict.close();

    let mut rebuilt = LevelDbDictionary::new();
    rebuilt.load_text_file(&plain_source, &ParseOptions::default()).unwrap();
    rebuilt.save_to_binary_file(&dir).unwrap();
    assert_eq!(rebuilt.concat_separator(), "");
    rebuilt.close();

    let mut reopened = LevelDbDictionary::new();
    reopened.load_binary_file(&dir).unwrap();

    assert_eq!(reopened.concat_separator(), "");
    assert_eq!(reopened.find("k").unwrap(), None);
    assert_eq!(reopened.prefix_search("m").unwrap(), rows(&[("m", "p|q")]));
    assert_eq!(reopened.prefix_search("").unwrap(), rows(&[("m", "p|q")]));
}

#[test]
fn test_rebuild_keeps_only_new_keys() {
    let fixture = DictFixture::new();
    let first = fixture.write_text("first.txt", "a\t1\nb\t2\n");
    let second = fixture.write_text("second.txt", "b\t3\nc\t4\n");
    let dir = fixture.path("store");

    let mut dict = LevelDbDictionary::new();
    dict.load_text_file(&first, &ParseOptions::default()).unwrap();
    dict.save_to_binary_file(&dir).unwrap();
    dict.close();

    dict.load_text_file(&second, &ParseOptions::default()).unwrap();
    dict.save_to_binary_file(&dir).unwrap();

    assert_eq!(
        dict.prefix_search("").unwrap(),
        rows(&[("b", "3"), ("c", "4")])
    );
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_save_without_text_is_misuse() {
    let fixture = DictFixture::new();
    let mut dict = LevelDbDictionary::new();
    let err = dict.save_to_binary_file(&fixture.path("store")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Misuse);
}

#[test]
fn test_save_while_open_is_misuse() {
    let fixture = DictFixture::new();
    let (mut dict, _) = populated(&fixture, "store");

    let err = dict.save_to_binary_file(&fixture.path("second")).unwrap_err();
    assert!(err.is_misuse());
    assert!(!fixture.path("second").exists());
}

#[test]
fn test_load_while_open_is_misuse() {
    let fixture = DictFixture::new();
    let (mut dict, dir) = populated(&fixture, "store");

    assert!(dict.load_binary_file(&dir).unwrap_err().is_misuse());
    // The open store is still usable.
    check_accord_dictionary(&dict);
}

#[test]
fn test_queries_while_closed_are_misuse() {
    let dict = LevelDbDictionary::new();
    assert!(dict.find("accord").unwrap_err().is_misuse());
    assert!(dict.prefix_search("acc").unwrap_err().is_misuse());
}

#[test]
fn test_close_is_idempotent() {
    let fixture = DictFixture::new();
    let (mut dict, _) = populated(&fixture, "store");

    dict.close();
    dict.close();
    assert!(!dict.is_open());
    assert!(dict.find("accord").unwrap_err().is_misuse());
}
