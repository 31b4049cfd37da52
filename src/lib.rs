mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use app::run;
pub use application::CsvConversionUseCase;
pub use domain::csv::{
    CsvField, CsvValue, ParseError, ParseErrorCode, ParseErrorKind, ParseMeta, ParseOptions,
    ParseOptionsOverrides, ParseResult, Record, SkipEmptyLines, ValidationReport,
};
pub use domain::error::{AppError, Result};
pub use infrastructure::csv::{parse, unparse, validate};
