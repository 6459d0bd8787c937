use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::aggregator::Aggregator;
use crate::rank;
use crate::types::CanonicalItem;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/fixtures", get(fixtures))
        .route("/news", get(news))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct ListParams {
    /// Cap on the returned list, applied after sorting.
    #[serde(default)]
    limit: Option<usize>,
}

async fn fixtures(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Vec<CanonicalItem>> {
    let items = state.aggregator.collect_fixtures().await;
    Json(apply_limit(items, params.limit))
}

async fn news(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Vec<CanonicalItem>> {
    let items = state.aggregator.collect_news().await;
    Json(apply_limit(items, params.limit))
}

fn apply_limit(items: Vec<CanonicalItem>, limit: Option<usize>) -> Vec<CanonicalItem> {
    match limit {
        Some(n) => rank::truncate_top(items, n),
        None => items,
    }
}
