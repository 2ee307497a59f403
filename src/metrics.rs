use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and describe the pipeline series.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        describe();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
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

fn describe() {
    describe_counter!("feed_items_total", "Items parsed from feed documents.");
    describe_counter!(
        "feed_items_kept_total",
        "Items kept after completeness and relevance filtering."
    );
    describe_counter!("feed_fetch_errors_total", "Feed fetch/parse failures.");
    describe_counter!("enrich_calls_total", "Calls made to the text model.");
    describe_counter!(
        "enrich_fallback_total",
        "Fallback records produced, by reason."
    );
    describe_counter!("update_added_total", "Articles added to the store.");
    describe_counter!(
        "update_deferred_total",
        "New articles left for a later cycle by the per-cycle cap."
    );
    describe_gauge!("update_last_run_ts", "Unix ts when an update cycle last ran.");
}
