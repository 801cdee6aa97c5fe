use crate::error::{Result, StoreError};
use reqwest::Url;
use std::time::Duration;

pub const DEFAULT_TABLE: &str = "bird_strikes";

/// Connection descriptor for the hosted record store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub(crate) base_url: Url,
    pub(crate) api_key: String,
    pub(crate) table: String,
    pub(crate) timeout: Duration,
}

impl StoreConfig {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(StoreError::Config("store URL is empty".to_string()));
        }
        let base_url = Url::parse(trimmed)
            .map_err(|e| StoreError::Config(format!("store URL '{}': {}", trimmed, e)))?;
        if api_key.trim().is_empty() {
            return Err(StoreError::Config("API key is empty".to_string()));
        }

        Ok(Self {
            base_url,
            api_key: api_key.trim().to_string(),
            table: DEFAULT_TABLE.to_string(),
            timeout: Duration::from_secs(10),
        })
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout = Duration::from_secs(timeout_secs);
        self
    }

    /// REST endpoint of the configured table.
    pub fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.table
        )
    }
}
