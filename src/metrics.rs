use axum::{routing::get, Router};
use metrics::gauge;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::PipelineConfig;

/// Prometheus recorder for the pipeline. Install once at startup, before
/// the aggregator registers its series.
pub struct Metrics {
    handle: PrometheusHandle,
}

impl Metrics {
    pub fn init(cfg: &PipelineConfig) -> Self {
        // Default buckets; custom ones are not worth the per-version API churn.
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");

        // Static configuration gauges, set once.
        gauge!("aggregate_fixtures_cache_ttl_secs").set(cfg.fixtures_ttl_secs as f64);
        gauge!("aggregate_news_cache_ttl_secs").set(cfg.news_ttl_secs as f64);
        gauge!("aggregate_proxy_endpoints").set(cfg.proxies.len() as f64);
        gauge!("aggregate_sources_configured").set(cfg.sources.len() as f64);

        Self { handle }
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
