// src/scheduler.rs
use std::sync::Arc;

use metrics::counter;
use tokio::task::JoinHandle;

use crate::aggregator::Aggregator;

/// Spawn the periodic refresh trigger. The pipeline itself does not own
/// scheduling; this is the wiring the server binary uses to keep both
/// categories warm.
pub fn spawn_refresh_scheduler(aggregator: Arc<Aggregator>, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;

            let fixtures = aggregator.collect_fixtures().await;
            let news = aggregator.collect_news().await;

            counter!("aggregate_refresh_ticks_total").increment(1);
            tracing::info!(
                target: "aggregate",
                fixtures = fixtures.len(),
                news = news.len(),
                "refresh tick"
            );
        }
    })
}
