// ============================================================
// CSV VALUE
// ============================================================
// Closed set of values a record field can hold

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Largest integer an f64 represents exactly (2^53)
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A single field value
#[derive(Debug, Clone, PartialEq)]
pub enum CsvValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Empty,
}

impl CsvValue {
    /// Wrap raw field text without any coercion
    pub fn from_raw(raw: String) -> Self {
        if raw.is_empty() {
            CsvValue::Empty
        } else {
            CsvValue::String(raw)
        }
    }

    /// Convert a JSON value from an unparse request.
    /// Nested arrays and objects are kept as their compact JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => CsvValue::Empty,
            Value::Bool(b) => CsvValue::Boolean(*b),
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.abs() <= MAX_SAFE_INTEGER || n.is_f64() => CsvValue::Number(f),
                _ => CsvValue::String(n.to_string()),
            },
            Value::String(s) => CsvValue::from_raw(s.clone()),
            nested => CsvValue::String(nested.to_string()),
        }
    }

    /// Whether the value counts as an empty field
    pub fn is_empty(&self) -> bool {
        match self {
            CsvValue::Empty => true,
            CsvValue::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// Integral values print without a fractional part
fn integral(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Some(n as i64)
    } else {
        None
    }
}

impl fmt::Display for CsvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvValue::String(s) => f.write_str(s),
            CsvValue::Number(n) => match integral(*n) {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{}", n),
            },
            CsvValue::Boolean(b) => write!(f, "{}", b),
            CsvValue::Empty => Ok(()),
        }
    }
}

impl Serialize for CsvValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CsvValue::String(s) => serializer.serialize_str(s),
            CsvValue::Number(n) => match integral(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            CsvValue::Boolean(b) => serializer.serialize_bool(*b),
            CsvValue::Empty => serializer.serialize_str(""),
        }
    }
}

impl From<&str> for CsvValue {
    fn from(s: &str) -> Self {
        CsvValue::from_raw(s.to_string())
    }
}

impl From<f64> for CsvValue {
    fn from(n: f64) -> Self {
        CsvValue::Number(n)
    }
}

impl From<bool> for CsvValue {
    fn from(b: bool) -> Self {
        CsvValue::Boolean(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display() {
        assert_eq!(CsvValue::Number(999.0).to_string(), "999");
        assert_eq!(CsvValue::Number(-0.5).to_string(), "-0.5");
        assert_eq!(CsvValue::Boolean(false).to_string(), "false");
        assert_eq!(CsvValue::Empty.to_string(), "");
    }

    #[test]
    fn test_serialize_integral_number() {
        let encoded = serde_json::to_string(&vec![
            CsvValue::Number(30.0),
            CsvValue::Number(2.5),
            CsvValue::Empty,
        ])
        .unwrap();
        assert_eq!(encoded, r#"[30,2.5,""]"#);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(CsvValue::from_json(&json!(null)), CsvValue::Empty);
        assert_eq!(CsvValue::from_json(&json!("")), CsvValue::Empty);
        assert_eq!(CsvValue::from_json(&json!(29)), CsvValue::Number(29.0));
        assert_eq!(
            CsvValue::from_json(&json!([1, 2])),
            CsvValue::String("[1,2]".to_string())
        );
        // beyond 2^53 the digits are kept verbatim
        assert_eq!(
            CsvValue::from_json(&json!(18446744073709551615u64)),
            CsvValue::String("18446744073709551615".to_string())
        );
    }
}
