// One request read from an input stream, one response written back.
// Used when the process is driven by a job runner instead of HTTP.

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::error;

use crate::application::CsvConversionUseCase;
use crate::domain::conversion::FailureResponse;
use crate::domain::error::{AppError, Result};

/// Run a single request. The failure body is written before the error is
/// returned so callers only need to pick an exit status.
pub async fn run_once<R, W>(use_case: &CsvConversionUseCase, mut input: R, mut output: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut raw = String::new();
    input.read_to_string(&mut raw).await?;

    let outcome = match serde_json::from_str::<Value>(&raw) {
        Ok(request) => use_case.execute(request).await,
        Err(e) => Err(AppError::from(e)),
    };

    let (body, result) = match outcome {
        Ok(response) => (serde_json::to_vec_pretty(&response), Ok(())),
        Err(e) => {
            error!(error = %e, "Oneshot request failed");
            (serde_json::to_vec_pretty(&FailureResponse::from(&e)), Err(e))
        }
    };

    let body = body.map_err(|e| AppError::Internal(format!("Failed to encode response: {}", e)))?;
    output.write_all(&body).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;

    result
}
