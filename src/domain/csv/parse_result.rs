// ============================================================
// PARSE RESULT
// ============================================================
// Records, metadata and structural errors of one parse call

use serde::Serialize;

use super::Record;

/// Category of a structural error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseErrorKind {
    Quotes,
    Delimiter,
    FieldMismatch,
}

/// Specific structural error within its category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseErrorCode {
    MissingQuotes,
    InvalidQuotes,
    UndetectableDelimiter,
    TooFewFields,
    TooManyFields,
}

/// Non-fatal structural problem found while parsing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    #[serde(rename = "type")]
    pub kind: ParseErrorKind,

    pub code: ParseErrorCode,

    pub message: String,

    /// 1-based index of the emitted row (the header row is row 1)
    pub row: usize,

    /// 0-based field position within the row, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<usize>,
}

impl ParseError {
    pub fn missing_quotes(row: usize, field: usize) -> Self {
        Self {
            kind: ParseErrorKind::Quotes,
            code: ParseErrorCode::MissingQuotes,
            message: "Quoted field unterminated".to_string(),
            row,
            field: Some(field),
        }
    }

    pub fn invalid_quotes(row: usize, field: usize) -> Self {
        Self {
            kind: ParseErrorKind::Quotes,
            code: ParseErrorCode::InvalidQuotes,
            message: "Trailing quote on quoted field is malformed".to_string(),
            row,
            field: Some(field),
        }
    }

    pub fn undetectable_delimiter(fallback: &str) -> Self {
        Self {
            kind: ParseErrorKind::Delimiter,
            code: ParseErrorCode::UndetectableDelimiter,
            message: format!(
                "Unable to auto-detect delimiting character; defaulted to '{}'",
                fallback
            ),
            row: 1,
            field: None,
        }
    }

    pub fn too_few_fields(row: usize, expected: usize, parsed: usize) -> Self {
        Self {
            kind: ParseErrorKind::FieldMismatch,
            code: ParseErrorCode::TooFewFields,
            message: format!(
                "Too few fields: expected {} fields but parsed {}",
                expected, parsed
            ),
            row,
            field: Some(parsed),
        }
    }

    pub fn too_many_fields(row: usize, expected: usize, parsed: usize) -> Self {
        Self {
            kind: ParseErrorKind::FieldMismatch,
            code: ParseErrorCode::TooManyFields,
            message: format!(
                "Too many fields: expected {} fields but parsed {}",
                expected, parsed
            ),
            row,
            field: Some(expected),
        }
    }
}

/// Metadata describing how the input was read
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseMeta {
    /// Header names in encounter order; empty without a header row
    pub fields: Vec<String>,

    /// Delimiter actually used
    pub delimiter: String,

    /// Line terminator actually used
    pub linebreak: String,

    /// Rows were left unread because of `preview`
    pub truncated: bool,
}

/// Output of a single parse call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseResult {
    pub records: Vec<Record>,
    pub meta: ParseMeta,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Header width in header mode, otherwise the widest record
    pub fn column_count(&self) -> usize {
        if !self.meta.fields.is_empty() {
            return self.meta.fields.len();
        }
        self.records.iter().map(Record::key_count).max().unwrap_or(0)
    }
}
