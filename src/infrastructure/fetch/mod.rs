// ============================================================
// CSV FETCHER
// ============================================================
// Retrieve CSV text from http(s) URLs

#[cfg(test)]
pub mod testing;

use std::time::Duration;

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::FetchConfig;

#[async_trait]
pub trait CsvFetcher: Send + Sync {
    /// Fetch the body at `url` as text
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Inputs starting with an http(s) scheme are fetch targets; anything else
/// is literal CSV text.
pub fn is_remote_source(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }
}

#[async_trait]
impl CsvFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let url = Url::parse(url)
            .map_err(|e| AppError::FetchError(format!("Invalid URL {}: {}", url, e)))?;

        let mut response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::FetchError(format!(
                "Failed to fetch {}: HTTP {}",
                url, status
            )));
        }

        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_label)
            .map(str::to_string);

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(AppError::FetchError(format!(
                    "Response from {} exceeds {} bytes",
                    url, self.max_body_bytes
                )));
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url = %url, bytes = body.len(), charset = ?charset, "Fetched CSV body");
        Ok(decode_body(&body, charset.as_deref()))
    }
}

/// `charset` parameter of a Content-Type header value
fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Decode a body; a byte-order mark overrides the declared charset and
/// unknown labels fall back to UTF-8
pub fn decode_body(bytes: &[u8], charset: Option<&str>) -> String {
    let encoding = charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}
