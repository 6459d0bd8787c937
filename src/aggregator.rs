// src/aggregator.rs
//! Orchestrator. One `collect` call per category runs the whole pipeline:
//! cache check, per-source fan-out through the proxy fetcher and
//! extraction cascade, normalization, dedup/rank, cache write, and the
//! stale/synthetic fallbacks. Nothing in here returns an error to the
//! caller; every internal failure shrinks the result instead.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::cache::TtlCache;
use crate::config::PipelineConfig;
use crate::fallback;
use crate::fetch::{ProxyFetcher, ReqwestTransport, Transport};
use crate::normalize;
use crate::rank;
use crate::types::{CanonicalItem, Category, DraftRecord, SourceDescriptor};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "aggregate_fetch_attempts_total",
            "Proxy requests issued, successful or not."
        );
        describe_counter!(
            "aggregate_fetch_exhausted_total",
            "Fetches that ran out of proxy endpoints."
        );
        describe_counter!(
            "aggregate_parse_errors_total",
            "Structured parses (xml/json) that failed."
        );
        describe_counter!("aggregate_drafts_total", "Draft records leaving the cascade.");
        describe_counter!("aggregate_items_total", "Canonical items returned to callers.");
        describe_counter!("aggregate_cache_hits_total", "Collects served from cache.");
        describe_counter!(
            "aggregate_synthetic_runs_total",
            "Collects that fell back to synthetic data."
        );
        describe_counter!("aggregate_runs_total", "Full aggregation runs.");
        describe_histogram!("aggregate_parse_ms", "Extraction cascade time per payload.");
        describe_gauge!(
            "aggregate_last_run_ts",
            "Unix ts of the last full aggregation run."
        );
    });
}

pub struct Aggregator {
    cfg: PipelineConfig,
    fetcher: Arc<ProxyFetcher>,
    cache: TtlCache,
    fixture_flight: tokio::sync::Mutex<()>,
    article_flight: tokio::sync::Mutex<()>,
}

impl Aggregator {
    /// Build with an explicit transport (tests inject stubs here).
    pub fn new(cfg: PipelineConfig, transport: Arc<dyn Transport>) -> Self {
        ensure_metrics_described();
        let fetcher = Arc::new(ProxyFetcher::new(cfg.proxies.clone(), transport));
        let cache = TtlCache::new(cfg.fixtures_ttl_secs, cfg.news_ttl_secs);
        Self {
            cfg,
            fetcher,
            cache,
            fixture_flight: tokio::sync::Mutex::new(()),
            article_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Build with the real HTTP transport.
    pub fn with_http(cfg: PipelineConfig) -> Self {
        let transport = Arc::new(ReqwestTransport::new(
            Duration::from_secs(cfg.request_timeout_secs),
            &cfg.user_agent,
        ));
        Self::new(cfg, transport)
    }

    pub async fn collect_fixtures(&self) -> Vec<CanonicalItem> {
        self.collect(Category::Fixture).await
    }

    pub async fn collect_news(&self) -> Vec<CanonicalItem> {
        self.collect(Category::Article).await
    }

    /// Aggregate one category. Infallible: worst case is synthetic data.
    pub async fn collect(&self, category: Category) -> Vec<CanonicalItem> {
        let now = now_unix();
        if let Some(hit) = self.cache.get(category, now) {
            counter!("aggregate_cache_hits_total").increment(1);
            return hit;
        }

        // At most one aggregation in flight per category; a second caller
        // parks here and is then served the first run's cached result.
        let _flight = match category {
            Category::Fixture => self.fixture_flight.lock().await,
            Category::Article => self.article_flight.lock().await,
        };
        let now = now_unix();
        if let Some(hit) = self.cache.get(category, now) {
            counter!("aggregate_cache_hits_total").increment(1);
            return hit;
        }

        let merged = self.run_sources(category, now).await;
        let final_items = rank::finalize(category, merged);

        counter!("aggregate_runs_total").increment(1);
        gauge!("aggregate_last_run_ts").set(now as f64);

        if !final_items.is_empty() {
            counter!("aggregate_items_total").increment(final_items.len() as u64);
            self.cache.put(category, final_items.clone(), now);
            tracing::info!(
                target: "aggregate",
                category = category.as_str(),
                items = final_items.len(),
                "aggregation complete"
            );
            return final_items;
        }

        // Empty run: last good entry first, synthetic only when there has
        // never been one.
        if let Some(stale) = self.cache.get_stale(category) {
            tracing::warn!(
                target: "aggregate",
                category = category.as_str(),
                "aggregation empty, serving stale cache entry"
            );
            return stale;
        }

        counter!("aggregate_synthetic_runs_total").increment(1);
        tracing::warn!(
            target: "aggregate",
            category = category.as_str(),
            "aggregation empty with no cache, synthesizing fallback dataset"
        );
        rank::finalize(category, fallback::synthesize(category, now))
    }

    /// Fan out one fetch-and-extract task per source, then merge in the
    /// static configured source order so results are reproducible no
    /// matter which source answered first.
    async fn run_sources(&self, category: Category, now: u64) -> Vec<CanonicalItem> {
        let sources = self.cfg.sources_for(category);
        let deadline =
            tokio::time::Instant::now() + Duration::from_secs(self.cfg.budget_secs());

        let mut handles = Vec::with_capacity(sources.len());
        for descriptor in sources {
            let fetcher = Arc::clone(&self.fetcher);
            let desc = descriptor.clone();
            let handle = tokio::spawn(async move { fetch_and_extract(fetcher, desc).await });
            handles.push((descriptor, handle));
        }

        let mut merged = Vec::new();
        let mut seq = 0usize;
        for (descriptor, mut handle) in handles {
            let drafts = match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(drafts)) => drafts,
                Ok(Err(join_err)) => {
                    tracing::warn!(
                        target: "aggregate",
                        source = %descriptor.id,
                        error = ?join_err,
                        "source task failed"
                    );
                    Vec::new()
                }
                Err(_) => {
                    // Past the overall budget: whatever is still pending
                    // contributes zero items.
                    handle.abort();
                    tracing::warn!(
                        target: "aggregate",
                        source = %descriptor.id,
                        "source still pending past aggregation budget"
                    );
                    Vec::new()
                }
            };
            for draft in &drafts {
                if let Some(item) = normalize::normalize(draft, &descriptor, seq, now) {
                    merged.push(item);
                    seq += 1;
                }
            }
        }
        merged
    }
}

async fn fetch_and_extract(
    fetcher: Arc<ProxyFetcher>,
    descriptor: SourceDescriptor,
) -> Vec<DraftRecord> {
    match fetcher.fetch_text(&descriptor.url).await {
        Ok(body) => crate::extract::extract(&descriptor, &body),
        Err(e) => {
            tracing::warn!(
                target: "aggregate",
                source = %descriptor.id,
                error = %e,
                "source fetch failed, contributing zero records"
            );
            Vec::new()
        }
    }
}

fn now_unix() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
