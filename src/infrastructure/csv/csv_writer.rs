// ============================================================
// CSV WRITER
// ============================================================
// Serialize uniform named records back into CSV text

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::domain::csv::{CsvValue, ParseOptions, Record};
use crate::domain::error::{AppError, Result};

const DEFAULT_DELIMITER: &str = ",";
const DEFAULT_NEWLINE: &str = "\n";

/// CSV serializer configured from parse options
pub struct CsvWriter<'a> {
    options: &'a ParseOptions,
}

impl<'a> CsvWriter<'a> {
    pub fn new(options: &'a ParseOptions) -> Self {
        Self { options }
    }

    /// Render records as CSV text.
    ///
    /// The header comes from the first record's keys, in its key order.
    /// Later records are rendered in that order; keys they lack render as
    /// empty fields and keys the first record lacks are not written.
    pub fn write(&self, records: &[Record]) -> Result<String> {
        let Some(first) = records.first() else {
            return Ok(String::new());
        };

        if let Some(index) = records
            .iter()
            .position(|r| matches!(r, Record::Positional(_)))
        {
            return Err(AppError::InvalidInput(format!(
                "record {} has no field names; unparse expects an array of objects",
                index
            )));
        }

        let keys: Vec<String> = first.keys().into_iter().map(str::to_string).collect();
        let newline = self.newline();
        let delimiter = self.delimiter_byte()?;
        let quote = ascii_byte("quoteChar", self.options.quote_char)?;
        let escape = ascii_byte("escapeChar", self.options.escape_char)?;

        // The csv crate quotes any field holding a distinct escape byte, so
        // that dialect is quoted here and written verbatim
        let quote_by_hand = escape != quote;
        let quote_style = if quote_by_hand {
            QuoteStyle::Never
        } else if self.options.quotes {
            QuoteStyle::Always
        } else {
            QuoteStyle::Necessary
        };

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .quote(quote)
            .escape(escape)
            .double_quote(!quote_by_hand)
            .quote_style(quote_style)
            .terminator(match newline {
                "\r\n" => Terminator::CRLF,
                "\r" => Terminator::Any(b'\r'),
                _ => Terminator::Any(b'\n'),
            })
            .from_writer(Vec::new());

        let mut write_row = |row: Vec<String>| {
            let row = if quote_by_hand {
                self.quote_fields(row, delimiter as char)
            } else {
                row
            };
            writer.write_record(&row).map_err(write_error)
        };

        if self.options.header {
            write_row(keys.clone())?;
        }

        for record in records {
            let row: Vec<String> = keys
                .iter()
                .map(|key| record.get(key).map(ToString::to_string).unwrap_or_default())
                .collect();
            write_row(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("Failed to flush CSV output: {}", e)))?;
        let mut text = String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("CSV output is not UTF-8: {}", e)))?;

        // No terminator after the final row
        if text.ends_with(newline) {
            text.truncate(text.len() - newline.len());
        }

        Ok(text)
    }

    /// Quote a field only when it holds the delimiter, the quote character
    /// or a line break; quotes inside are prefixed with the escape character.
    fn quote_fields(&self, row: Vec<String>, delimiter: char) -> Vec<String> {
        let quote = self.options.quote_char;
        let escaped_quote = format!("{}{}", self.options.escape_char, quote);
        let lone_field = row.len() == 1;

        row.into_iter()
            .map(|field| {
                let needs_quotes = self.options.quotes
                    || (lone_field && field.is_empty())
                    || field.contains([delimiter, quote, '\r', '\n']);
                if needs_quotes {
                    format!("{}{}{}", quote, field.replace(quote, &escaped_quote), quote)
                } else {
                    field
                }
            })
            .collect()
    }

    fn newline(&self) -> &str {
        if self.options.newline.is_empty() {
            DEFAULT_NEWLINE
        } else {
            &self.options.newline
        }
    }

    fn delimiter_byte(&self) -> Result<u8> {
        let delimiter = if self.options.delimiter.is_empty() {
            DEFAULT_DELIMITER
        } else {
            &self.options.delimiter
        };

        match delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(AppError::InvalidInput(format!(
                "unparse requires a single ASCII delimiter, got \"{}\"",
                delimiter
            ))),
        }
    }
}

fn ascii_byte(option: &str, c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(AppError::InvalidInput(format!(
            "unparse requires an ASCII {}, got '{}'",
            option, c
        )))
    }
}

fn write_error(err: csv::Error) -> AppError {
    AppError::Internal(format!("Failed to write CSV row: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::csv::CsvField;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<Record> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| Record::from_json(v).unwrap())
            .collect()
    }

    #[test]
    fn test_write_products() {
        let options = ParseOptions::new();
        let csv = CsvWriter::new(&options)
            .write(&records(json!([
                {"product": "Laptop", "price": 999, "stock": 50},
                {"product": "Mouse", "price": 29, "stock": 200}
            ])))
            .unwrap();

        assert_eq!(csv, "product,price,stock\nLaptop,999,50\nMouse,29,200");
    }

    #[test]
    fn test_quotes_only_when_needed() {
        let options = ParseOptions::new();
        let csv = CsvWriter::new(&options)
            .write(&records(json!([
                {"name": "Smith, John", "note": "say \"hi\"", "bio": "a\nb", "plain": "x y"}
            ])))
            .unwrap();

        assert_eq!(
            csv,
            "name,note,bio,plain\n\"Smith, John\",\"say \"\"hi\"\"\",\"a\nb\",x y"
        );
    }

    #[test]
    fn test_first_record_key_order_wins() {
        let options = ParseOptions::new();
        let csv = CsvWriter::new(&options)
            .write(&records(json!([
                {"a": 1, "b": 2},
                {"b": 4, "a": 3},
                {"a": 5, "c": 6}
            ])))
            .unwrap();

        assert_eq!(csv, "a,b\n1,2\n3,4\n5,");
    }

    #[test]
    fn test_dialect_and_flags() {
        let options = ParseOptions {
            delimiter: ";".to_string(),
            newline: "\r\n".to_string(),
            header: false,
            quotes: true,
            ..ParseOptions::new()
        };
        let csv = CsvWriter::new(&options)
            .write(&[Record::Named(vec![
                CsvField::new("x", true),
                CsvField::new("y", 1.5),
            ])])
            .unwrap();

        assert_eq!(csv, "\"true\";\"1.5\"");
    }

    #[test]
    fn test_custom_escape_quotes_only_when_needed() {
        let options = ParseOptions {
            escape_char: '\\',
            ..ParseOptions::new()
        };
        let csv = CsvWriter::new(&options)
            .write(&records(json!([
                {"path": "C:\\dir", "note": "say \"hi\"", "pair": "a,b"}
            ])))
            .unwrap();

        assert_eq!(csv, "path,note,pair\nC:\\dir,\"say \\\"hi\\\"\",\"a,b\"");

        let always = ParseOptions {
            escape_char: '\\',
            quotes: true,
            ..ParseOptions::new()
        };
        let csv = CsvWriter::new(&always)
            .write(&records(json!([{"path": "C:\\dir"}])))
            .unwrap();
        assert_eq!(csv, "\"path\"\n\"C:\\dir\"");
    }

    #[test]
    fn test_idempotent() {
        let options = ParseOptions::new();
        let input = records(json!([{"k": "v, w"}, {"k": null}]));
        let writer = CsvWriter::new(&options);
        assert_eq!(writer.write(&input).unwrap(), writer.write(&input).unwrap());
    }

    #[test]
    fn test_rejects_positional_records_and_wide_delimiters() {
        let options = ParseOptions::new();
        let err = CsvWriter::new(&options)
            .write(&[Record::Positional(vec![CsvValue::Empty])])
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let options = ParseOptions {
            delimiter: "||".to_string(),
            ..ParseOptions::new()
        };
        let err = CsvWriter::new(&options)
            .write(&records(json!([{"a": 1}])))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_input() {
        let options = ParseOptions::new();
        assert_eq!(CsvWriter::new(&options).write(&[]).unwrap(), "");
    }
}
