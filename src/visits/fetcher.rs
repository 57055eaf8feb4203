//! Upstream fetch fan-out.
//!
//! # Responsibilities
//! - Build `<base>/<location>.json` URLs
//! - GET every location concurrently and wait for all of them
//! - Turn every failure into a value so one bad upstream cannot fail the batch
//! - Cap body size at [`MAX_BODY_BYTES`]; anything longer is a failed fetch

use std::time::{Duration, Instant};

use futures_util::future::join_all;
use reqwest::{Client, Response};

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::visits::locations::LocationSet;
use crate::visits::types::{FetchFailure, FetchOutcome, RawVisit};

/// Largest upstream body read. A count is a handful of bytes.
pub const MAX_BODY_BYTES: usize = 4 * 1024;

/// HTTP client for the per-location visit-count endpoints.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn location_url(&self, location: &str) -> String {
        format!("{}/{}.json", self.base_url, location)
    }

    /// Fetch one location. Never fails; see [`FetchOutcome`].
    pub async fn fetch_count(&self, location: &str) -> FetchOutcome {
        let url = self.location_url(location);

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => return FetchOutcome::Failed(classify(e)),
        };

        let status = response.status();
        if !status.is_success() {
            // Status alone does not decide; the body still has to parse.
            tracing::debug!(location = %location, status = %status, "Upstream returned non-success status");
        }

        let body = match read_capped(response).await {
            Ok(b) => b,
            Err(failure) => return FetchOutcome::Failed(failure),
        };

        match serde_json::from_slice(&body) {
            Ok(value) => FetchOutcome::Fetched(value),
            Err(e) => FetchOutcome::Failed(FetchFailure::Body(e.to_string())),
        }
    }

    /// Fetch every location concurrently.
    ///
    /// Returns exactly one entry per location, in the set's order.
    pub async fn fetch_all(&self, locations: &LocationSet) -> Vec<RawVisit> {
        let fetches = locations.iter().map(|location| async move {
            let start = Instant::now();
            let outcome = self.fetch_count(location).await;

            match &outcome {
                FetchOutcome::Fetched(_) => metrics::record_fetch("ok", start),
                FetchOutcome::Failed(failure) => {
                    tracing::warn!(
                        location = %location,
                        reason = %failure,
                        "Upstream fetch failed, counting as zero"
                    );
                    metrics::record_fetch(failure.kind(), start);
                }
            }

            outcome.into_raw(location)
        });

        join_all(fetches).await
    }
}

async fn read_capped(mut response: Response) -> Result<Vec<u8>, FetchFailure> {
    let too_large = || FetchFailure::Body(format!("body exceeds {} bytes", MAX_BODY_BYTES));

    if response.content_length().is_some_and(|len| len > MAX_BODY_BYTES as u64) {
        return Err(too_large());
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(classify)? {
        if body.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn classify(e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout
    } else if e.is_decode() || e.is_body() {
        FetchFailure::Body(e.to_string())
    } else {
        FetchFailure::Transport(e.to_string())
    }
}
