// ============================================================
// VALIDATION REPORT
// ============================================================
// Structural diagnostics derived from a parse result

use serde::Serialize;
use std::collections::BTreeMap;

/// Structural diagnostics of a parse result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// At least one record was produced
    pub has_data: bool,

    /// A header row supplied field names
    pub has_headers: bool,

    /// At least one structural error was recorded
    pub has_errors: bool,

    /// Every record has as many keys as the first one
    pub is_consistent: bool,

    /// Field name -> 0-based indices of records where it is empty or absent
    pub empty_fields: BTreeMap<String, Vec<usize>>,

    /// Header names seen more than once, each listed once
    pub duplicate_headers: Vec<String>,
}

impl ValidationReport {
    /// Overall verdict: data present, no structural errors, consistent widths
    pub fn is_valid(&self) -> bool {
        self.has_data && !self.has_errors && self.is_consistent
    }
}
