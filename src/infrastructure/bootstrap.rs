use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::application::CsvConversionUseCase;
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::fetch::HttpFetcher;

/// Install the fmt subscriber. RUST_LOG wins over the configured filter.
/// Logs go to stderr so stdout stays reserved for oneshot responses.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn build_use_case(config: &AppConfig) -> Result<Arc<CsvConversionUseCase>> {
    let fetcher = HttpFetcher::new(&config.fetch)?;
    info!(
        timeout_secs = ?config.fetch.timeout_secs,
        max_body_bytes = config.fetch.max_body_bytes,
        "HTTP fetcher ready"
    );
    Ok(Arc::new(CsvConversionUseCase::new(Arc::new(fetcher))))
}
