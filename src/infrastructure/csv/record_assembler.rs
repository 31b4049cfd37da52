// ============================================================
// RECORD ASSEMBLER
// ============================================================
// Turn tokenized rows into named or positional records

use crate::domain::csv::{CsvField, CsvValue, ParseError, ParseOptions, Record};

use super::type_coercion::coerce;

/// Records plus header metadata and field-count errors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledRecords {
    pub records: Vec<Record>,

    /// Header names; empty when the input has no header row
    pub fields: Vec<String>,

    pub errors: Vec<ParseError>,
}

/// Assembles rows into records according to parse options
pub struct RecordAssembler<'a> {
    options: &'a ParseOptions,
}

impl<'a> RecordAssembler<'a> {
    pub fn new(options: &'a ParseOptions) -> Self {
        Self { options }
    }

    pub fn assemble(&self, rows: Vec<Vec<String>>) -> AssembledRecords {
        if self.options.header {
            self.assemble_named(rows)
        } else {
            AssembledRecords {
                records: rows
                    .into_iter()
                    .map(|row| Record::Positional(row.into_iter().map(|raw| self.value(raw)).collect()))
                    .collect(),
                ..Default::default()
            }
        }
    }

    fn assemble_named(&self, rows: Vec<Vec<String>>) -> AssembledRecords {
        let mut rows = rows.into_iter();
        let Some(header) = rows.next() else {
            return AssembledRecords::default();
        };

        let fields: Vec<String> = header
            .into_iter()
            .map(|name| {
                if self.options.trim_headers {
                    name.trim().to_string()
                } else {
                    name
                }
            })
            .collect();

        let mut records = Vec::new();
        let mut errors = Vec::new();

        for (offset, row) in rows.enumerate() {
            // header is row 1
            let row_number = offset + 2;
            let parsed = row.len();

            if parsed < fields.len() {
                errors.push(ParseError::too_few_fields(row_number, fields.len(), parsed));
            } else if parsed > fields.len() {
                errors.push(ParseError::too_many_fields(row_number, fields.len(), parsed));
            }

            // Missing trailing keys stay absent, extra values are dropped
            let record = fields
                .iter()
                .zip(row)
                .map(|(name, raw)| CsvField {
                    name: name.clone(),
                    value: self.value(raw),
                })
                .collect();
            records.push(Record::Named(record));
        }

        AssembledRecords {
            records,
            fields,
            errors,
        }
    }

    fn value(&self, raw: String) -> CsvValue {
        if self.options.dynamic_typing {
            coerce(raw)
        } else {
            CsvValue::from_raw(raw)
        }
    }
}
