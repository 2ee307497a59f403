// src/bin/update_once.rs
//! One-shot run for cron jobs and manual checks.
//!
//!   update_once               run one full update cycle
//!   update_once --fetch-only  fetch + filter only, print what was found

use asd_news_digest::{logging::init_tracing, AppConfig, UpdatePipeline};
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env()?;
    let pipeline = UpdatePipeline::from_config(&cfg)?;

    if std::env::args().any(|a| a == "--fetch-only") {
        let items = pipeline.fetch_and_filter().await;
        println!("{} relevant articles", items.len());
        for it in items {
            println!("{}  [{}]  {}", it.published_at, it.source, it.title);
        }
        return Ok(());
    }

    match pipeline.run_cycle().await {
        Ok(report) => {
            println!("{}", report.message);
            Ok(())
        }
        Err(e) => {
            error!(error = ?e, "update failed");
            std::process::exit(1);
        }
    }
}
