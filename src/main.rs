//! matchwire — Binary Entrypoint
//! Boots the Axum HTTP server over the aggregation pipeline and the
//! periodic refresh trigger.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use matchwire::aggregator::Aggregator;
use matchwire::api::{create_router, AppState};
use matchwire::metrics::Metrics;
use matchwire::scheduler::spawn_refresh_scheduler;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aggregate=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Configuration errors are the one fatal path: an aggregator that can
    // never fetch anything should refuse to start, not degrade silently.
    let cfg = matchwire::config::load_default()?;
    let metrics = Metrics::init(&cfg);

    let refresh_interval = cfg.refresh_interval_secs;
    let aggregator = Arc::new(Aggregator::with_http(cfg));
    spawn_refresh_scheduler(Arc::clone(&aggregator), refresh_interval);

    let router = create_router(AppState {
        aggregator: Arc::clone(&aggregator),
    })
    .merge(metrics.router());

    let addr = std::env::var("MATCHWIRE_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "matchwire listening");
    axum::serve(listener, router).await?;
    Ok(())
}
