// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Tokenizing, record assembly, type coercion, serialization and
// structural validation. Every entry point is a pure function.

mod csv_writer;
mod record_assembler;
mod structure_validator;
mod tokenizer;
mod type_coercion;

pub use csv_writer::CsvWriter;
pub use record_assembler::{AssembledRecords, RecordAssembler};
pub use structure_validator::StructureValidator;
pub use tokenizer::{CsvTokenizer, TokenizedText};
pub use type_coercion::coerce;

use crate::domain::csv::{ParseMeta, ParseOptions, ParseResult, Record, ValidationReport};
use crate::domain::error::Result;

/// Parse CSV text into records, metadata and structural errors
pub fn parse(text: &str, options: &ParseOptions) -> ParseResult {
    let tokenized = CsvTokenizer::new(options).tokenize(text);
    let assembled = RecordAssembler::new(options).assemble(tokenized.rows);

    let mut errors = tokenized.errors;
    errors.extend(assembled.errors);
    errors.sort_by_key(|e| e.row);

    ParseResult {
        records: assembled.records,
        meta: ParseMeta {
            fields: assembled.fields,
            delimiter: tokenized.delimiter,
            linebreak: tokenized.newline,
            truncated: tokenized.truncated,
        },
        errors,
    }
}

/// Serialize named records into CSV text
pub fn unparse(records: &[Record], options: &ParseOptions) -> Result<String> {
    CsvWriter::new(options).write(records)
}

/// Structural diagnostics of a parse result
pub fn validate(result: &ParseResult) -> ValidationReport {
    StructureValidator::validate(result)
}
