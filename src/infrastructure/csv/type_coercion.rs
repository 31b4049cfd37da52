// ============================================================
// TYPE COERCION
// ============================================================
// Opportunistic conversion of field text into numbers and booleans

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::csv::{CsvValue, MAX_SAFE_INTEGER};

static NUMERIC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-?(\d+\.?|\.\d+|\d+\.\d+)([eE][-+]?\d+)?\s*$").unwrap());

/// Coerce raw field text.
///
/// `true`/`false` (exact case) become booleans, numeric text within the
/// exactly-representable range becomes a number, empty text stays empty and
/// everything else is kept as a string.
pub fn coerce(raw: String) -> CsvValue {
    if raw.is_empty() {
        return CsvValue::Empty;
    }
    if raw == "true" {
        return CsvValue::Boolean(true);
    }
    if raw == "false" {
        return CsvValue::Boolean(false);
    }

    if NUMERIC_PATTERN.is_match(&raw) {
        if let Ok(n) = raw.trim().parse::<f64>() {
            if n.abs() <= MAX_SAFE_INTEGER {
                return CsvValue::Number(n);
            }
        }
    }

    CsvValue::String(raw)
}
