// ============================================================
// CSV DOMAIN LAYER
// ============================================================
// Core types and value objects for CSV conversion and validation
// No I/O, no async

mod csv_value;
mod parse_options;
mod parse_result;
mod record;
mod validation_report;

pub use csv_value::{CsvValue, MAX_SAFE_INTEGER};
pub use parse_options::{
    CommentsOption, ParseOptions, ParseOptionsOverrides, SkipEmptyLines, DELIMITER_CANDIDATES,
    SUPPORTED_NEWLINES,
};
pub use parse_result::{ParseError, ParseErrorCode, ParseErrorKind, ParseMeta, ParseResult};
pub use record::{json_type_name, CsvField, Record};
pub use validation_report::ValidationReport;
