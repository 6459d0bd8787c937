// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregator;
pub mod api;
pub mod cache;
pub mod config;
pub mod extract;
pub mod fallback;
pub mod fetch;
pub mod metrics;
pub mod normalize;
pub mod rank;
pub mod scheduler;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::aggregator::Aggregator;
pub use crate::api::{create_router, AppState};
pub use crate::config::PipelineConfig;
pub use crate::fetch::{FetchError, ProxyFetcher, Transport, TransportResponse};
pub use crate::types::{CanonicalItem, Category, SourceDescriptor};
