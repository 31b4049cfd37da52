// ============================================================
// CSV CONVERSION USE CASE
// ============================================================
// Dispatch one parse / unparse / validate request

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::domain::conversion::{
    ConversionRequest, ConversionResponse, ParseResponse, UnparseResponse, ValidateResponse,
};
use crate::domain::csv::{ParseOptions, ParseOptionsOverrides, Record};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::csv::{parse, unparse, validate};
use crate::infrastructure::fetch::{is_remote_source, CsvFetcher};

/// Stateless request dispatcher; every call owns its own result tree
pub struct CsvConversionUseCase {
    fetcher: Arc<dyn CsvFetcher>,
    defaults: ParseOptions,
}

impl CsvConversionUseCase {
    pub fn new(fetcher: Arc<dyn CsvFetcher>) -> Self {
        Self {
            fetcher,
            defaults: ParseOptions::default(),
        }
    }

    /// Check a raw JSON request and run it
    pub async fn execute(&self, request: Value) -> Result<ConversionResponse> {
        let request = ConversionRequest::from_value(request)?;
        self.dispatch(request).await
    }

    pub async fn dispatch(&self, request: ConversionRequest) -> Result<ConversionResponse> {
        let request_id = Uuid::new_v4();
        let operation = request.operation();
        let span = info_span!("conversion", %request_id, %operation);

        async move {
            let outcome = match request {
                ConversionRequest::Parse { csv_data, options } => {
                    self.parse_csv(csv_data, options).await
                }
                ConversionRequest::Validate { csv_data, options } => {
                    self.validate_csv(csv_data, options).await
                }
                ConversionRequest::Unparse { json_data, options } => {
                    self.unparse_json(&json_data, options)
                }
            };

            if let Err(e) = &outcome {
                error!(error = %e, "Conversion failed");
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn parse_csv(
        &self,
        csv_data: String,
        overrides: ParseOptionsOverrides,
    ) -> Result<ConversionResponse> {
        let options = self.resolve_options(overrides)?;
        let text = self.load_csv(csv_data).await?;

        let result = parse(&text, &options);
        info!(
            rows = result.records.len(),
            errors = result.errors.len(),
            delimiter = ?result.meta.delimiter,
            "Parsed CSV"
        );

        Ok(ConversionResponse::Parse(ParseResponse::from(result)))
    }

    async fn validate_csv(
        &self,
        csv_data: String,
        overrides: ParseOptionsOverrides,
    ) -> Result<ConversionResponse> {
        let options = self.resolve_options(overrides)?;
        let text = self.load_csv(csv_data).await?;

        let result = parse(&text, &options);
        let report = validate(&result);
        info!(
            rows = result.records.len(),
            errors = result.errors.len(),
            is_valid = report.is_valid(),
            "Validated CSV"
        );

        Ok(ConversionResponse::Validate(ValidateResponse::new(
            result, report,
        )))
    }

    fn unparse_json(
        &self,
        json_data: &[Value],
        overrides: ParseOptionsOverrides,
    ) -> Result<ConversionResponse> {
        let options = self.resolve_options(overrides)?;

        let records = json_data
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Record::from_json(item)
                    .map_err(|e| AppError::InvalidInput(format!("jsonData[{}]: {}", index, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        let csv = unparse(&records, &options)?;
        info!(rows = records.len(), bytes = csv.len(), "Unparsed records");

        Ok(ConversionResponse::Unparse(UnparseResponse::new(
            csv,
            records.len(),
        )))
    }

    fn resolve_options(&self, overrides: ParseOptionsOverrides) -> Result<ParseOptions> {
        self.defaults
            .merged(overrides)
            .map_err(|e| AppError::InvalidRequest(format!("Invalid options: {}", e)))
    }

    /// Literal CSV text, or the body behind an http(s) URL
    async fn load_csv(&self, csv_data: String) -> Result<String> {
        if !is_remote_source(&csv_data) {
            return Ok(csv_data);
        }

        info!(url = %csv_data, "Fetching remote CSV");
        self.fetcher.fetch(&csv_data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fetch::testing::StaticFetcher;
    use serde_json::json;

    fn use_case(fetcher: StaticFetcher) -> (CsvConversionUseCase, Arc<StaticFetcher>) {
        let fetcher = Arc::new(fetcher);
        (CsvConversionUseCase::new(fetcher.clone()), fetcher)
    }

    async fn run(request: Value) -> Result<Value> {
        let (use_case, _) = use_case(StaticFetcher::new());
        let response = use_case.execute(request).await?;
        Ok(serde_json::to_value(response).unwrap())
    }

    #[tokio::test]
    async fn test_parse_scenario() {
        let response = run(json!({
            "operation": "parse",
            "csvData": "name,age,city\nJohn,30,NYC\nJane,25,LA",
            "options": {"header": true, "dynamicTyping": true}
        }))
        .await
        .unwrap();

        assert_eq!(response["success"], json!(true));
        assert_eq!(response["operation"], json!("parse"));
        assert_eq!(
            response["data"],
            json!([
                {"name": "John", "age": 30, "city": "NYC"},
                {"name": "Jane", "age": 25, "city": "LA"}
            ])
        );
        assert_eq!(response["rowCount"], json!(2));
        assert_eq!(response["columnCount"], json!(3));
        assert_eq!(response["meta"]["fields"], json!(["name", "age", "city"]));
        assert_eq!(response["errors"], json!([]));
    }

    #[tokio::test]
    async fn test_validate_scenario() {
        let response = run(json!({
            "operation": "validate",
            "csvData": "name,age,city\nJohn,30,NYC\n,25,LA\nBob,invalid,Chicago"
        }))
        .await
        .unwrap();

        assert_eq!(response["isValid"], json!(true));
        assert_eq!(
            response["validations"],
            json!({
                "hasData": true,
                "hasHeaders": true,
                "hasErrors": false,
                "isConsistent": true,
                "emptyFields": {"name": [1]},
                "duplicateHeaders": []
            })
        );
        assert_eq!(response["data"][2]["age"], json!("invalid"));
    }

    #[tokio::test]
    async fn test_validate_reports_structural_errors() {
        let response = run(json!({
            "operation": "validate",
            "csvData": "id,id,name\n1,2,a\n3,4"
        }))
        .await
        .unwrap();

        assert_eq!(response["isValid"], json!(false));
        assert_eq!(response["validations"]["isConsistent"], json!(false));
        assert_eq!(response["validations"]["duplicateHeaders"], json!(["id"]));
        assert_eq!(response["errors"][0]["code"], json!("TooFewFields"));
        assert_eq!(response["errors"][0]["row"], json!(3));
    }

    #[tokio::test]
    async fn test_unparse_scenario() {
        let response = run(json!({
            "operation": "unparse",
            "jsonData": [
                {"product": "Laptop", "price": 999, "stock": 50},
                {"product": "Mouse", "price": 29, "stock": 200}
            ]
        }))
        .await
        .unwrap();

        let csv = "product,price,stock\nLaptop,999,50\nMouse,29,200";
        assert_eq!(response["csv"], json!(csv));
        assert_eq!(response["rowCount"], json!(2));
        assert_eq!(response["byteSize"], json!(csv.len()));
    }

    async fn round_trip(json_data: Value) -> Value {
        let unparsed = run(json!({"operation": "unparse", "jsonData": json_data}))
            .await
            .unwrap();
        run(json!({"operation": "parse", "csvData": unparsed["csv"]}))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_comma_value_round_trips() {
        let records = json!([{"name": "Smith, John"}, {"name": "Doe, Jane"}]);
        let parsed = round_trip(records.clone()).await;
        assert_eq!(parsed["data"], records);
    }

    #[tokio::test]
    async fn test_semicolon_values_round_trip() {
        let single = json!([{"name": "a;b"}, {"name": "c;d"}]);
        let parsed = round_trip(single.clone()).await;
        assert_eq!(parsed["data"], single);
        assert_eq!(parsed["meta"]["delimiter"], json!(","));

        let wide = json!([{"id": "x;1", "name": "a;b"}, {"id": "y;2", "name": "c"}]);
        let parsed = round_trip(wide.clone()).await;
        assert_eq!(parsed["data"], wide);
        assert_eq!(parsed["errors"], json!([]));
    }

    #[tokio::test]
    async fn test_unparse_rejects_non_objects() {
        let err = run(json!({"operation": "unparse", "jsonData": [{"a": 1}, 7]}))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AppError::InvalidInput("jsonData[1]: expected an object, got number".to_string())
        );
    }

    #[tokio::test]
    async fn test_non_string_csv_data_fails() {
        let err = run(json!({"operation": "parse", "csvData": 12345}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(ref msg) if msg.contains("got number")));
    }

    #[tokio::test]
    async fn test_remote_csv_is_fetched() {
        let url = "https://data.example.com/people.csv";
        let (use_case, fetcher) =
            use_case(StaticFetcher::new().with_page(url, "id;score\n1;9.5"));

        let response = use_case
            .execute(json!({"operation": "parse", "csvData": url}))
            .await
            .unwrap();
        let response = serde_json::to_value(response).unwrap();

        assert_eq!(fetcher.requested(), vec![url.to_string()]);
        assert_eq!(response["data"], json!([{"id": 1, "score": 9.5}]));
        assert_eq!(response["meta"]["delimiter"], json!(";"));
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_request() {
        let (use_case, _) = use_case(StaticFetcher::new());
        let err = use_case
            .execute(json!({"operation": "validate", "csvData": "http://missing.example/x.csv"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FetchError(_)));
    }

    #[tokio::test]
    async fn test_invalid_options_are_fatal() {
        let err = run(json!({
            "operation": "parse",
            "csvData": "a,b",
            "options": {"quoteChar": "<<"}
        }))
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(ref msg) if msg.starts_with("Invalid options")));
    }
}
