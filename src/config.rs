//! Configuration for rimedict
//!
//! Text ingestion settings with sensible defaults.

use serde::Deserialize;

/// Default separator used to join values of duplicated keys
pub const DEFAULT_CONCAT_SEPARATOR: &str = "$|$";

/// Strategy for lines whose key was already seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnDuplicatedKey {
    /// Last occurrence wins
    #[default]
    Overwrite,

    /// First occurrence wins, later ones are dropped
    Skip,

    /// Values are joined with the concat separator, in file order
    Concat,
}

impl OnDuplicatedKey {
    /// Lenient name lookup: unknown names fall back to `Overwrite`
    pub fn from_name(name: &str) -> Self {
        match name {
            "Skip" => OnDuplicatedKey::Skip,
            "Concat" => OnDuplicatedKey::Concat,
            _ => OnDuplicatedKey::Overwrite,
        }
    }
}

impl<'de> Deserialize<'de> for OnDuplicatedKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// How raw text lines become dictionary entries
///
/// Field names follow the options object the scripting bindings pass in, so a
/// JSON value like `{"delimiter": "\t", "onDuplicatedKey": "Concat"}` decodes
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    // -------------------------------------------------------------------------
    // Line Splitting
    // -------------------------------------------------------------------------
    /// Separates key from value; only the first occurrence splits
    pub delimiter: String,

    /// Lines starting with this prefix are ignored (empty disables comments)
    pub comment: String,

    /// Every character in this set is removed from a line before splitting
    pub chars_to_remove: String,

    /// Lines are `value<delim>key` instead of `key<delim>value`
    pub is_reversed: bool,

    /// Maximum number of physical lines to read (None or 0 reads everything)
    pub lines: Option<usize>,

    // -------------------------------------------------------------------------
    // Duplicate Keys
    // -------------------------------------------------------------------------
    pub on_duplicated_key: OnDuplicatedKey,

    /// Joins values when `on_duplicated_key` is `Concat`
    pub concat_separator: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: "\t".to_string(),
            comment: "#".to_string(),
            chars_to_remove: "\r".to_string(),
            is_reversed: false,
            lines: None,
            on_duplicated_key: OnDuplicatedKey::Overwrite,
            concat_separator: DEFAULT_CONCAT_SEPARATOR.to_string(),
        }
    }
}

impl ParseOptions {
    /// Create a new options builder
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::default()
    }

    /// Effective line cap; a cap of zero means no cap
    pub(crate) fn line_limit(&self) -> Option<usize> {
        self.lines.filter(|&max| max > 0)
    }

    /// Separator the built dictionary must remember, if any
    pub(crate) fn effective_separator(&self) -> Option<&str> {
        match self.on_duplicated_key {
            OnDuplicatedKey::Concat => Some(&self.concat_separator),
            _ => None,
        }
    }
}

/// Builder for ParseOptions
#[derive(Default)]
pub struct ParseOptionsBuilder {
    options: ParseOptions,
}

impl ParseOptionsBuilder {
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.options.delimiter = delimiter.into();
        self
    }

    pub fn comment(mut self, prefix: impl Into<String>) -> Self {
        self.options.comment = prefix.into();
        self
    }

    pub fn chars_to_remove(mut self, chars: impl Into<String>) -> Self {
        self.options.chars_to_remove = chars.into();
        self
    }

    pub fn reversed(mut self, reversed: bool) -> Self {
        self.options.is_reversed = reversed;
        self
    }

    /// Stop reading after this many physical lines (0 reads everything)
    pub fn lines(mut self, count: usize) -> Self {
        self.options.lines = Some(count);
        self
    }

    pub fn on_duplicated_key(mut self, policy: OnDuplicatedKey) -> Self {
        self.options.on_duplicated_key = policy;
        self
    }

    pub fn concat_separator(mut self, separator: impl Into<String>) -> Self {
        self.options.concat_separator = separator.into();
        self
    }

    /// Shorthand for `Concat` with the given separator
    pub fn concat_with(self, separator: impl Into<String>) -> Self {
        self.on_duplicated_key(OnDuplicatedKey::Concat)
            .concat_separator(separator)
    }

    pub fn build(self) -> ParseOptions {
        self.options
    }
}
