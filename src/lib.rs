// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod article;
pub mod config;
pub mod enrich;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod scheduler;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::article::{article_id, EnrichedArticle};
pub use crate::config::AppConfig;
pub use crate::pipeline::{CycleReport, UpdatePipeline};
