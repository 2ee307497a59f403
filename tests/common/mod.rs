// tests/common/mod.rs
//
// Shared builders for the integration tests: synthetic feed documents and a
// pipeline wired to in-memory collaborators (no network, no real sleeping).
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use asd_news_digest::enrich::{DynEnricher, UnconfiguredEnricher};
use asd_news_digest::ingest::providers::FixtureProvider;
use asd_news_digest::ingest::types::FeedSource;
use asd_news_digest::pipeline::throttle::{RecordingSleeper, ThrottledRunner};
use asd_news_digest::store::MemoryStore;
use asd_news_digest::UpdatePipeline;

pub const DELAY: Duration = Duration::from_millis(4_500);

/// Minimal RSS 2.0 document. Each item is (title, link, pubDate).
pub fn rss(items: &[(&str, &str, &str)]) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel><title>t</title>",
    );
    for (title, link, date) in items {
        out.push_str(&format!(
            "<item><title>{title}</title><link>{link}</link><pubDate>{date}</pubDate>\
             <description>About autism support.</description></item>"
        ));
    }
    out.push_str("</channel></rss>");
    out
}

/// `n` distinct items, numbered from `start`, dated one hour apart.
pub fn numbered_items(start: usize, n: usize) -> Vec<(String, String, String)> {
    (start..start + n)
        .map(|i| {
            (
                format!("Story {i}"),
                format!("https://asd.example/story/{i}"),
                format!("2025-06-10T{:02}:00:00Z", i % 24),
            )
        })
        .collect()
}

pub fn rss_owned(items: &[(String, String, String)]) -> String {
    let borrowed: Vec<(&str, &str, &str)> = items
        .iter()
        .map(|(t, l, d)| (t.as_str(), l.as_str(), d.as_str()))
        .collect();
    rss(&borrowed)
}

pub fn dedicated(url: &str, name: &str) -> FeedSource {
    FeedSource::new(url, name, true)
}

pub struct Harness {
    pub pipeline: UpdatePipeline,
    pub store: Arc<MemoryStore>,
    pub sleeper: RecordingSleeper,
}

pub fn harness(
    provider: FixtureProvider,
    sources: Vec<FeedSource>,
    store: MemoryStore,
    enricher: DynEnricher,
    max_per_cycle: usize,
    retention: usize,
) -> Harness {
    let store = Arc::new(store);
    let sleeper = RecordingSleeper::new();
    let runner = ThrottledRunner::with_sleeper(DELAY, max_per_cycle, Arc::new(sleeper.clone()));
    let pipeline = UpdatePipeline::new(
        sources,
        Arc::new(provider),
        enricher,
        store.clone(),
        runner,
        retention,
    );
    Harness {
        pipeline,
        store,
        sleeper,
    }
}

/// One dedicated feed serving `body`, default limits, fallback enricher.
pub fn single_feed(body: String, store: MemoryStore) -> Harness {
    let url = "https://asd.example/rss";
    harness(
        FixtureProvider::new().with(url, body),
        vec![dedicated(url, "ASD Example")],
        store,
        Arc::new(UnconfiguredEnricher),
        10,
        50,
    )
}
