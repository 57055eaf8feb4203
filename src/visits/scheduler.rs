//! Periodic in-process runs.
//!
//! # Responsibilities
//! - Run the aggregation job on a fixed interval
//! - Log each run's outcome; a failed run does not stop the schedule

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::ScheduleConfig;
use crate::visits::aggregator::VisitAggregator;

pub struct VisitScheduler {
    aggregator: Arc<VisitAggregator>,
    config: ScheduleConfig,
}

impl VisitScheduler {
    pub fn new(aggregator: Arc<VisitAggregator>, config: ScheduleConfig) -> Self {
        Self { aggregator, config }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Scheduled runs disabled");
            return;
        }

        tracing::info!(interval = self.config.interval_secs, "Visit scheduler starting");

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Outcome is already logged and counted by the aggregator.
                    if let Ok(records) = self.aggregator.run().await {
                        tracing::debug!(records = records.len(), "Scheduled run stored records");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Visit scheduler received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
