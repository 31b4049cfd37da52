// ============================================================
// STRUCTURE VALIDATOR
// ============================================================
// Consistency, empty-field and duplicate-header diagnostics

use std::collections::{BTreeMap, HashSet};

use crate::domain::csv::{ParseResult, Record, ValidationReport};

/// Computes a [`ValidationReport`] from a parse result
pub struct StructureValidator;

impl StructureValidator {
    pub fn validate(result: &ParseResult) -> ValidationReport {
        ValidationReport {
            has_data: !result.records.is_empty(),
            has_headers: !result.meta.fields.is_empty(),
            has_errors: !result.errors.is_empty(),
            is_consistent: Self::is_consistent(&result.records),
            empty_fields: Self::empty_fields(result),
            duplicate_headers: Self::duplicate_headers(&result.meta.fields),
        }
    }

    /// Every record has the first record's key count; vacuously true
    fn is_consistent(records: &[Record]) -> bool {
        match records.first() {
            Some(first) => records.iter().all(|r| r.key_count() == first.key_count()),
            None => true,
        }
    }

    /// Record indices per field whose value is empty or absent.
    /// Positional records are keyed by column position.
    fn empty_fields(result: &ParseResult) -> BTreeMap<String, Vec<usize>> {
        let mut empty: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let width = result.column_count();

        for (index, record) in result.records.iter().enumerate() {
            let names: Vec<String> = match record {
                Record::Named(fields) if result.meta.fields.is_empty() => {
                    fields.iter().map(|f| f.name.clone()).collect()
                }
                Record::Named(_) => result.meta.fields.clone(),
                Record::Positional(_) => (0..width).map(|position| position.to_string()).collect(),
            };

            for (position, name) in names.into_iter().enumerate() {
                let is_empty = record.get_index(position).map_or(true, |v| v.is_empty());
                if !is_empty {
                    continue;
                }

                let indices = empty.entry(name).or_default();
                // a repeated header name reports each record once
                if indices.last() != Some(&index) {
                    indices.push(index);
                }
            }
        }

        empty
    }

    /// Names seen more than once, in order of their first repeat
    fn duplicate_headers(fields: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates: Vec<String> = Vec::new();

        for name in fields {
            if !seen.insert(name.as_str()) && !duplicates.contains(name) {
                duplicates.push(name.clone());
            }
        }

        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::csv::{CsvField, CsvValue, ParseMeta};

    fn named(pairs: &[(&str, &str)]) -> Record {
        Record::Named(pairs.iter().map(|(k, v)| CsvField::new(*k, *v)).collect())
    }

    fn result(fields: &[&str], records: Vec<Record>) -> ParseResult {
        ParseResult {
            records,
            meta: ParseMeta {
                fields: fields.iter().map(|f| f.to_string()).collect(),
                ..Default::default()
            },
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_empty_result_is_consistent() {
        let report = StructureValidator::validate(&ParseResult::default());
        assert!(report.is_consistent);
        assert!(!report.has_data);
        assert!(!report.is_valid());
    }

    #[test]
    fn test_inconsistent_widths() {
        let report = StructureValidator::validate(&result(
            &["a", "b"],
            vec![named(&[("a", "1"), ("b", "2")]), named(&[("a", "3")])],
        ));
        assert!(!report.is_consistent);
        // the absent key counts as empty
        assert_eq!(report.empty_fields.get("b"), Some(&vec![1]));
    }

    #[test]
    fn test_empty_fields_indices() {
        let report = StructureValidator::validate(&result(
            &["name", "age"],
            vec![
                named(&[("name", "John"), ("age", "30")]),
                named(&[("name", ""), ("age", "25")]),
                named(&[("name", ""), ("age", "")]),
            ],
        ));

        assert_eq!(report.empty_fields.len(), 2);
        assert_eq!(report.empty_fields["name"], vec![1, 2]);
        assert_eq!(report.empty_fields["age"], vec![2]);
    }

    #[test]
    fn test_duplicate_headers_listed_once() {
        let report = StructureValidator::validate(&result(
            &["id", "name", "id", "id", "name", "email"],
            Vec::new(),
        ));
        assert_eq!(report.duplicate_headers, vec!["id", "name"]);
        assert!(report.has_headers);
    }

    #[test]
    fn test_positional_empty_fields() {
        let report = StructureValidator::validate(&result(
            &[],
            vec![
                Record::Positional(vec![CsvValue::from("a"), CsvValue::Empty]),
                Record::Positional(vec![CsvValue::from("b")]),
            ],
        ));

        assert!(!report.has_headers);
        assert!(!report.is_consistent);
        assert_eq!(report.empty_fields["1"], vec![0, 1]);
        assert!(!report.empty_fields.contains_key("0"));
    }
}
