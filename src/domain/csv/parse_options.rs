// ============================================================
// PARSE OPTIONS
// ============================================================
// Tokenizer, assembler and serializer settings, merged from
// service defaults and per-request overrides

use serde::{Deserialize, Serialize, Serializer};

/// Candidate delimiters for auto-detection, in priority order
pub const DELIMITER_CANDIDATES: [&str; 4] = [",", ";", "\t", "|"];

/// Line terminators accepted by the `newline` option
pub const SUPPORTED_NEWLINES: [&str; 3] = ["\r\n", "\n", "\r"];

/// Which rows count as empty and get dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "SkipEmptyLinesRepr")]
pub enum SkipEmptyLines {
    /// Keep every row
    Never,

    /// Drop rows whose fields are all empty strings
    #[default]
    Empty,

    /// Also drop rows whose fields are all whitespace
    Greedy,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SkipEmptyLinesRepr {
    Flag(bool),
    Mode(String),
}

impl TryFrom<SkipEmptyLinesRepr> for SkipEmptyLines {
    type Error = String;

    fn try_from(repr: SkipEmptyLinesRepr) -> Result<Self, Self::Error> {
        match repr {
            SkipEmptyLinesRepr::Flag(true) => Ok(SkipEmptyLines::Empty),
            SkipEmptyLinesRepr::Flag(false) => Ok(SkipEmptyLines::Never),
            SkipEmptyLinesRepr::Mode(mode) if mode == "greedy" => Ok(SkipEmptyLines::Greedy),
            SkipEmptyLinesRepr::Mode(mode) => Err(format!(
                "skipEmptyLines must be a boolean or \"greedy\", got \"{}\"",
                mode
            )),
        }
    }
}

impl Serialize for SkipEmptyLines {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SkipEmptyLines::Never => serializer.serialize_bool(false),
            SkipEmptyLines::Empty => serializer.serialize_bool(true),
            SkipEmptyLines::Greedy => serializer.serialize_str("greedy"),
        }
    }
}

/// `comments` accepts a prefix string, `true` (meaning `#`) or `false`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CommentsOption {
    Toggle(bool),
    Prefix(String),
}

/// Fully resolved options. Immutable once built by [`ParseOptions::merged`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOptions {
    /// Treat the first row as field names
    pub header: bool,

    /// Coerce numeric and boolean field text into typed values
    pub dynamic_typing: bool,

    pub skip_empty_lines: SkipEmptyLines,

    /// Field separator; empty means auto-detect
    pub delimiter: String,

    /// Row separator; empty means auto-detect
    pub newline: String,

    pub quote_char: char,

    /// Character that, followed by `quote_char`, yields a literal quote
    pub escape_char: char,

    /// Comment line prefix, `None` when disabled
    pub comments: Option<String>,

    /// Strip surrounding whitespace from header names
    pub trim_headers: bool,

    /// Maximum number of data records to read; 0 reads everything
    pub preview: usize,

    /// Quote every field when serializing
    pub quotes: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            header: true,
            dynamic_typing: true,
            skip_empty_lines: SkipEmptyLines::Empty,
            delimiter: String::new(),
            newline: String::new(),
            quote_char: '"',
            escape_char: '"',
            comments: None,
            trim_headers: true,
            preview: 0,
            quotes: false,
        }
    }
}

/// Caller-supplied overrides. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ParseOptionsOverrides {
    pub header: Option<bool>,
    pub dynamic_typing: Option<bool>,
    pub skip_empty_lines: Option<SkipEmptyLines>,
    pub delimiter: Option<String>,
    pub newline: Option<String>,
    pub quote_char: Option<String>,
    pub escape_char: Option<String>,
    pub comments: Option<CommentsOption>,
    pub trim_headers: Option<bool>,
    pub preview: Option<usize>,
    pub quotes: Option<bool>,
}

impl ParseOptions {
    /// Create options with the service defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply overrides on top of `self`; caller values win.
    /// The merged options are validated before being returned.
    pub fn merged(&self, overrides: ParseOptionsOverrides) -> Result<Self, String> {
        let mut merged = self.clone();

        if let Some(header) = overrides.header {
            merged.header = header;
        }
        if let Some(dynamic_typing) = overrides.dynamic_typing {
            merged.dynamic_typing = dynamic_typing;
        }
        if let Some(skip) = overrides.skip_empty_lines {
            merged.skip_empty_lines = skip;
        }
        if let Some(delimiter) = overrides.delimiter {
            merged.delimiter = delimiter;
        }
        if let Some(newline) = overrides.newline {
            merged.newline = newline;
        }
        if let Some(quote) = overrides.quote_char {
            merged.quote_char = single_char("quoteChar", &quote)?;
        }
        if let Some(escape) = overrides.escape_char {
            merged.escape_char = single_char("escapeChar", &escape)?;
        }
        if let Some(comments) = overrides.comments {
            merged.comments = match comments {
                CommentsOption::Toggle(false) => None,
                CommentsOption::Toggle(true) => Some("#".to_string()),
                CommentsOption::Prefix(prefix) => Some(prefix),
            };
        }
        if let Some(trim_headers) = overrides.trim_headers {
            merged.trim_headers = trim_headers;
        }
        if let Some(preview) = overrides.preview {
            merged.preview = preview;
        }
        if let Some(quotes) = overrides.quotes {
            merged.quotes = quotes;
        }

        merged.validate()?;
        Ok(merged)
    }

    /// Validate option values
    pub fn validate(&self) -> Result<(), String> {
        if self.delimiter.contains(self.quote_char) {
            return Err("delimiter must not contain the quote character".to_string());
        }
        if self.delimiter.contains('\n') || self.delimiter.contains('\r') {
            return Err("delimiter must not contain line breaks".to_string());
        }
        if !self.newline.is_empty() && !SUPPORTED_NEWLINES.contains(&self.newline.as_str()) {
            return Err("newline must be one of \"\\n\", \"\\r\\n\" or \"\\r\"".to_string());
        }
        if let Some(prefix) = &self.comments {
            if prefix.is_empty() {
                return Err("comments prefix must not be empty".to_string());
            }
            if !self.delimiter.is_empty() && *prefix == self.delimiter {
                return Err("comments prefix must differ from the delimiter".to_string());
            }
        }
        Ok(())
    }
}

fn single_char(option: &str, value: &str) -> Result<char, String> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!(
            "{} must be exactly one character, got \"{}\"",
            option, value
        )),
    }
}
