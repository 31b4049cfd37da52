use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::CsvFetcher;
use crate::domain::error::{AppError, Result};

/// In-memory fetcher serving fixed bodies by URL
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    /// URLs fetched so far, in order
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl CsvFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| {
            AppError::FetchError(format!("Failed to fetch {}: HTTP 404 Not Found", url))
        })
    }
}
