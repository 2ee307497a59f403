//! News digest service binary.
//! Boots the Axum HTTP server, the daily scheduler and the metrics route.

use std::sync::Arc;

use asd_news_digest::{
    api, logging::init_tracing, metrics::Metrics, scheduler, AppConfig, AppState, UpdatePipeline,
};
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env()?;
    let metrics = Metrics::init()?;
    let pipeline = Arc::new(UpdatePipeline::from_config(&cfg)?);
    let state = AppState::new(pipeline, cfg.trigger.clone());

    if let Some(hour) = cfg.update.daily_hour {
        scheduler::spawn_daily_update(state.clone(), hour);
    }

    let router = api::router(state).merge(metrics.router());
    Ok(router.into())
}
