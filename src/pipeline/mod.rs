// src/pipeline/mod.rs
//! Update cycle: fetch -> dedup -> enrich (throttled) -> merge -> persist.
//!
//! The cycle keeps no intermediate state. Either the whole merged list is
//! written at the end or nothing is; re-running is safe because stored
//! items are always excluded again by id/title.

pub mod dedup;
pub mod throttle;

use anyhow::{Context, Result};
use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::article::EnrichedArticle;
use crate::config::AppConfig;
use crate::enrich::{build_enricher, DynEnricher};
use crate::ingest::providers::HttpFeedProvider;
use crate::ingest::types::{FeedSource, RawArticle, SourceProvider};
use crate::store::{build_store, DynStore};
use dedup::{dedup_by_title, merge_and_truncate, select_unprocessed};
use throttle::ThrottledRunner;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleReport {
    pub added: usize,
    /// New articles left for a later cycle because of the per-cycle cap.
    pub deferred: usize,
    pub message: String,
}

pub fn report_message(added: usize, deferred: usize) -> String {
    match (added, deferred) {
        (0, _) => "新しい記事はありませんでした。".to_string(),
        (n, 0) => format!("{n}件の新しい記事を追加しました。"),
        (n, m) => format!("{n}件を追加しました。残り{m}件は次回更新で処理されます。"),
    }
}

pub struct UpdatePipeline {
    sources: Vec<FeedSource>,
    provider: Arc<dyn SourceProvider>,
    enricher: DynEnricher,
    store: DynStore,
    runner: ThrottledRunner,
    retention: usize,
}

impl UpdatePipeline {
    pub fn new(
        sources: Vec<FeedSource>,
        provider: Arc<dyn SourceProvider>,
        enricher: DynEnricher,
        store: DynStore,
        runner: ThrottledRunner,
        retention: usize,
    ) -> Self {
        Self {
            sources,
            provider,
            enricher,
            store,
            runner,
            retention,
        }
    }

    /// Production wiring: HTTP feeds, config-selected enricher and store.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let provider = Arc::new(HttpFeedProvider::new()?);
        let enricher = build_enricher(&cfg.ai);
        let store = build_store(&cfg.storage)?;
        let runner = ThrottledRunner::new(
            Duration::from_millis(cfg.update.delay_ms),
            cfg.update.max_per_cycle,
        );
        info!(
            target: "pipeline",
            feeds = cfg.feeds.len(),
            enricher = enricher.provider_name(),
            store = store.backend_name(),
            max_per_cycle = cfg.update.max_per_cycle,
            delay_ms = cfg.update.delay_ms,
            retention = cfg.update.retention,
            "pipeline ready"
        );
        Ok(Self::new(
            cfg.feeds.clone(),
            provider,
            enricher,
            store,
            runner,
            cfg.update.retention,
        ))
    }

    pub fn store(&self) -> &DynStore {
        &self.store
    }

    /// All relevant items from every configured source, newest first.
    pub async fn fetch_and_filter(&self) -> Vec<RawArticle> {
        crate::ingest::fetch_all(self.provider.as_ref(), &self.sources).await
    }

    pub async fn run_cycle(&self) -> Result<CycleReport> {
        info!(target: "pipeline", "news update started");

        let fresh = self.fetch_and_filter().await;
        let (fresh, same_title) = dedup_by_title(fresh);

        let stored = self.store.load().await.context("loading stored news")?;
        let unprocessed = select_unprocessed(fresh, &stored);
        info!(
            target: "pipeline",
            new = unprocessed.len(),
            cap = self.runner.max_items(),
            dropped_same_title = same_title,
            "new articles found"
        );

        let enricher = &self.enricher;
        let outcome = self
            .runner
            .run(unprocessed, move |i, total, raw: RawArticle| async move {
                info!(target: "pipeline", "[{}/{}] processing: {}", i + 1, total, raw.title);
                let result = enricher
                    .analyze(&raw.title, raw.snippet.as_deref().unwrap_or(""), &raw.source)
                    .await;
                EnrichedArticle::from_parts(raw, result)
            })
            .await;

        let added = outcome.results;
        let deferred = outcome.deferred;
        let count = added.len();
        counter!("update_deferred_total").increment(deferred as u64);
        gauge!("update_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

        if count == 0 {
            info!(target: "pipeline", "no new articles");
            return Ok(CycleReport {
                added: 0,
                deferred,
                message: report_message(0, deferred),
            });
        }

        let merged = merge_and_truncate(added, stored, self.retention);
        self.store.save(&merged).await.context("saving news")?;
        counter!("update_added_total").increment(count as u64);

        let message = report_message(count, deferred);
        info!(target: "pipeline", added = count, deferred, stored = merged.len(), "{message}");
        Ok(CycleReport {
            added: count,
            deferred,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_cover_all_cases() {
        assert_eq!(report_message(0, 0), "新しい記事はありませんでした。");
        assert_eq!(report_message(3, 0), "3件の新しい記事を追加しました。");
        assert_eq!(
            report_message(10, 2),
            "10件を追加しました。残り2件は次回更新で処理されます。"
        );
    }
}
