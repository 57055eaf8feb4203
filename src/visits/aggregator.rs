//! The aggregation job: fetch, validate, persist, sort.

use std::time::Instant;

use thiserror::Error;

use crate::config::AggregatorConfig;
use crate::observability::metrics;
use crate::visits::fetcher::UpstreamClient;
use crate::visits::locations::{LocationError, LocationSet};
use crate::visits::schema::validate_visits;
use crate::visits::store::{StoreSetupError, VisitStore};
use crate::visits::types::{AggregateError, VisitRecord};

/// Errors building the aggregator from configuration.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid location set: {0}")]
    Locations(#[from] LocationError),

    #[error("failed to build upstream client: {0}")]
    Upstream(#[source] reqwest::Error),

    #[error("failed to build store client: {0}")]
    Store(#[from] StoreSetupError),
}

/// Immutable job wiring, built once at startup and shared.
#[derive(Debug, Clone)]
pub struct VisitAggregator {
    locations: LocationSet,
    upstream: UpstreamClient,
    store: VisitStore,
}

impl VisitAggregator {
    pub fn new(locations: LocationSet, upstream: UpstreamClient, store: VisitStore) -> Self {
        Self {
            locations,
            upstream,
            store,
        }
    }

    pub fn from_config(config: &AggregatorConfig) -> Result<Self, StartupError> {
        let locations = LocationSet::resolve(&config.upstream.locations)?;
        let upstream = UpstreamClient::new(&config.upstream).map_err(StartupError::Upstream)?;
        let store = VisitStore::new(&config.store)?;
        Ok(Self::new(locations, upstream, store))
    }

    pub fn locations(&self) -> &LocationSet {
        &self.locations
    }

    /// Run the job once.
    ///
    /// On success the records have been inserted (in location order) and are
    /// returned sorted ascending by count.
    pub async fn run(&self) -> Result<Vec<VisitRecord>, AggregateError> {
        let start = Instant::now();
        tracing::info!(locations = self.locations.len(), "Aggregation run starting");

        let result = self.run_inner().await;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(records) => {
                metrics::record_run("ok", start);
                metrics::record_inserted(records.len());
                tracing::info!(records = records.len(), elapsed_ms, "Aggregation run complete");
            }
            Err(e) => {
                metrics::record_run(e.kind(), start);
                tracing::error!(error = %e, elapsed_ms, "Aggregation run failed");
            }
        }

        result
    }

    async fn run_inner(&self) -> Result<Vec<VisitRecord>, AggregateError> {
        let raw = self.upstream.fetch_all(&self.locations).await;
        let mut records = validate_visits(raw)?;

        self.store.insert(&records).await?;

        sort_by_count(&mut records);
        Ok(records)
    }
}

/// Ascending by count; ties keep location order.
pub fn sort_by_count(records: &mut [VisitRecord]) {
    records.sort_by(|a, b| a.count_f64().total_cmp(&b.count_f64()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_rejects_bad_locations() {
        let mut config = AggregatorConfig::default();
        config.store.api_key = "key".into();
        config.upstream.locations = vec!["ok".into(), "not/ok".into()];

        let err = VisitAggregator::from_config(&config).unwrap_err();
        assert!(matches!(err, StartupError::Locations(LocationError::Invalid(_))));
    }

    #[test]
    fn test_sort_by_count_mixed_numbers() {
        let mut records = vec![
            VisitRecord::new("a", 10),
            VisitRecord::new("b", serde_json::Number::from_f64(2.5).unwrap()),
            VisitRecord::new("c", -4),
            VisitRecord::new("d", 0),
            VisitRecord::new("e", 2),
            VisitRecord::new("f", 0),
        ];

        sort_by_count(&mut records);

        let order: Vec<_> = records.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(order, vec!["c", "d", "f", "e", "b", "a"]);
    }

    #[test]
    fn test_from_config_default_locations() {
        let mut config = AggregatorConfig::default();
        config.store.api_key = "key".into();

        let aggregator = VisitAggregator::from_config(&config).unwrap();
        assert_eq!(aggregator.locations().len(), 25);
    }
}
