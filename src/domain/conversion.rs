// ============================================================
// CONVERSION REQUEST / RESPONSE TYPES
// ============================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::domain::csv::{
    json_type_name, ParseError, ParseMeta, ParseOptionsOverrides, ParseResult, Record,
    ValidationReport,
};
use crate::domain::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Parse,
    Unparse,
    Validate,
}

impl FromStr for Operation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "parse" => Ok(Operation::Parse),
            "unparse" => Ok(Operation::Unparse),
            "validate" => Ok(Operation::Validate),
            other => Err(AppError::InvalidRequest(format!(
                "Unknown operation: {}. Expected one of parse, unparse, validate",
                other
            ))),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Parse => write!(f, "parse"),
            Operation::Unparse => write!(f, "unparse"),
            Operation::Validate => write!(f, "validate"),
        }
    }
}

/// A checked request. Unknown top-level keys are ignored; unknown option
/// keys are rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionRequest {
    Parse {
        csv_data: String,
        options: ParseOptionsOverrides,
    },
    Unparse {
        json_data: Vec<Value>,
        options: ParseOptionsOverrides,
    },
    Validate {
        csv_data: String,
        options: ParseOptionsOverrides,
    },
}

impl ConversionRequest {
    pub fn operation(&self) -> Operation {
        match self {
            ConversionRequest::Parse { .. } => Operation::Parse,
            ConversionRequest::Unparse { .. } => Operation::Unparse,
            ConversionRequest::Validate { .. } => Operation::Validate,
        }
    }

    /// Check the shape of a raw JSON request
    pub fn from_value(value: Value) -> Result<Self> {
        let mut body = match value {
            Value::Object(body) => body,
            other => {
                return Err(AppError::InvalidRequest(format!(
                    "request must be a JSON object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        let operation = match body.remove("operation") {
            None | Some(Value::Null) => {
                return Err(AppError::InvalidRequest("operation is required".to_string()))
            }
            Some(Value::String(op)) => op.parse::<Operation>()?,
            Some(other) => {
                return Err(AppError::InvalidRequest(format!(
                    "operation must be a string, got {}",
                    json_type_name(&other)
                )))
            }
        };

        let options = take_options(&mut body)?;

        match operation {
            Operation::Parse => Ok(ConversionRequest::Parse {
                csv_data: take_csv_data(&mut body, operation)?,
                options,
            }),
            Operation::Validate => Ok(ConversionRequest::Validate {
                csv_data: take_csv_data(&mut body, operation)?,
                options,
            }),
            Operation::Unparse => match body.remove("jsonData") {
                None | Some(Value::Null) => Err(AppError::InvalidRequest(
                    "jsonData is required for unparse".to_string(),
                )),
                Some(Value::Array(items)) => Ok(ConversionRequest::Unparse {
                    json_data: items,
                    options,
                }),
                Some(other) => Err(AppError::InvalidRequest(format!(
                    "jsonData must be an array of objects, got {}",
                    json_type_name(&other)
                ))),
            },
        }
    }
}

fn take_csv_data(body: &mut Map<String, Value>, operation: Operation) -> Result<String> {
    match body.remove("csvData") {
        None | Some(Value::Null) => Err(AppError::InvalidRequest(format!(
            "csvData is required for {}",
            operation
        ))),
        Some(Value::String(data)) => Ok(data),
        Some(other) => Err(AppError::InvalidRequest(format!(
            "csvData must be a string (CSV text or http(s) URL), got {}",
            json_type_name(&other)
        ))),
    }
}

fn take_options(body: &mut Map<String, Value>) -> Result<ParseOptionsOverrides> {
    match body.remove("options") {
        None | Some(Value::Null) => Ok(ParseOptionsOverrides::default()),
        Some(options @ Value::Object(_)) => serde_json::from_value(options)
            .map_err(|e| AppError::InvalidRequest(format!("Invalid options: {}", e))),
        Some(other) => Err(AppError::InvalidRequest(format!(
            "options must be an object, got {}",
            json_type_name(&other)
        ))),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    pub success: bool,
    pub operation: Operation,
    pub data: Vec<Record>,
    pub meta: ParseMeta,
    pub errors: Vec<ParseError>,
    pub row_count: usize,
    pub column_count: usize,
}

impl From<ParseResult> for ParseResponse {
    fn from(result: ParseResult) -> Self {
        let column_count = result.column_count();
        Self {
            success: true,
            operation: Operation::Parse,
            row_count: result.records.len(),
            column_count,
            data: result.records,
            meta: result.meta,
            errors: result.errors,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnparseResponse {
    pub success: bool,
    pub operation: Operation,
    pub csv: String,
    pub row_count: usize,
    pub byte_size: usize,
}

impl UnparseResponse {
    pub fn new(csv: String, row_count: usize) -> Self {
        Self {
            success: true,
            operation: Operation::Unparse,
            byte_size: csv.len(),
            csv,
            row_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub success: bool,
    pub operation: Operation,
    pub is_valid: bool,
    pub validations: ValidationReport,
    pub data: Vec<Record>,
    pub meta: ParseMeta,
    pub errors: Vec<ParseError>,
}

impl ValidateResponse {
    pub fn new(result: ParseResult, validations: ValidationReport) -> Self {
        Self {
            success: true,
            operation: Operation::Validate,
            is_valid: validations.is_valid(),
            validations,
            data: result.records,
            meta: result.meta,
            errors: result.errors,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ConversionResponse {
    Parse(ParseResponse),
    Unparse(UnparseResponse),
    Validate(ValidateResponse),
}

/// Body returned when a request fails as a whole
#[derive(Debug, Clone, Serialize)]
pub struct FailureResponse {
    pub success: bool,
    pub error: String,
}

impl From<&AppError> for FailureResponse {
    fn from(err: &AppError) -> Self {
        Self {
            success: false,
            error: err.message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request_error(value: Value) -> String {
        match ConversionRequest::from_value(value) {
            Err(AppError::InvalidRequest(msg)) => msg,
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_request() {
        let request = ConversionRequest::from_value(json!({
            "operation": "parse",
            "csvData": "a,b\n1,2",
            "options": {"header": false}
        }))
        .unwrap();

        assert_eq!(request.operation(), Operation::Parse);
        match request {
            ConversionRequest::Parse { csv_data, options } => {
                assert_eq!(csv_data, "a,b\n1,2");
                assert_eq!(options.header, Some(false));
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_csv_data_type_mismatch() {
        let msg = request_error(json!({"operation": "parse", "csvData": 42}));
        assert!(msg.contains("csvData must be a string"));
        assert!(msg.contains("number"));
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            request_error(json!({"operation": "validate"})),
            "csvData is required for validate"
        );
        assert_eq!(
            request_error(json!({"operation": "unparse"})),
            "jsonData is required for unparse"
        );
        assert_eq!(request_error(json!({"csvData": "a"})), "operation is required");
    }

    #[test]
    fn test_json_data_must_be_array() {
        let msg = request_error(json!({"operation": "unparse", "jsonData": {"a": 1}}));
        assert_eq!(msg, "jsonData must be an array of objects, got object");
    }

    #[test]
    fn test_unknown_operation_and_options() {
        assert!(request_error(json!({"operation": "merge", "csvData": ""}))
            .starts_with("Unknown operation: merge"));
        assert!(request_error(json!({
            "operation": "parse",
            "csvData": "a",
            "options": {"fastMode": true}
        }))
        .starts_with("Invalid options"));
    }

    #[test]
    fn test_unparse_response_byte_size() {
        let response = UnparseResponse::new("é,b".to_string(), 0);
        assert_eq!(response.byte_size, 4);
    }
}
