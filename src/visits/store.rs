//! Destination table client.
//!
//! Inserts go through the table's PostgREST interface as a single batch
//! `POST /rest/v1/<table>`. Error bodies from the store are passed through
//! without interpretation.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::StoreConfig;
use crate::visits::types::{StoreError, VisitRecord};

/// Errors building the store client.
#[derive(Debug, Error)]
pub enum StoreSetupError {
    #[error("invalid API key: {0}")]
    ApiKey(#[from] InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Append-only client for the visits table.
#[derive(Debug, Clone)]
pub struct VisitStore {
    client: Client,
    insert_url: String,
}

impl VisitStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreSetupError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(&config.api_key)?;
        key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))?;
        bearer.set_sensitive(true);
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("prefer", HeaderValue::from_static("return=minimal"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            insert_url: format!(
                "{}/rest/v1/{}",
                config.url.trim_end_matches('/'),
                config.table
            ),
        })
    }

    pub fn insert_url(&self) -> &str {
        &self.insert_url
    }

    /// Insert all records in one request.
    pub async fn insert(&self, records: &[VisitRecord]) -> Result<(), StoreError> {
        let response = self
            .client
            .post(&self.insert_url)
            .json(records)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(records = records.len(), status = %status, "Inserted visit records");
            return Ok(());
        }

        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({ "message": text }));

        tracing::error!(status = %status, body = %body, "Store rejected insert");
        Err(StoreError::Rejected { status, body })
    }
}
