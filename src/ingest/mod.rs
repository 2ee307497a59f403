// src/ingest/mod.rs
//! Feed fetching: per-source download, repair, parse, relevance filter,
//! then one list sorted newest first.

pub mod parse;
pub mod providers;
pub mod repair;
pub mod types;

use anyhow::Result;
use metrics::counter;
use std::cmp::Reverse;
use tracing::{info, warn};

use crate::ingest::parse::{parse_feed, parse_published};
use crate::ingest::repair::repair_ampersands;
use crate::ingest::types::{FeedSource, RawArticle, SourceProvider};

/// Terms that make an item from a general (non-dedicated) feed relevant.
pub const TOPIC_KEYWORDS: [&str; 4] = ["autism", "asd", "spectrum disorder", "autistic"];

/// Dedicated feeds take everything; others need a keyword in the title or
/// snippet (case-insensitive substring).
pub fn is_relevant(source: &FeedSource, title: &str, snippet: Option<&str>) -> bool {
    if source.dedicated {
        return true;
    }
    let title = title.to_lowercase();
    let snippet = snippet.map(str::to_lowercase).unwrap_or_default();
    TOPIC_KEYWORDS
        .iter()
        .any(|k| title.contains(k) || snippet.contains(k))
}

/// Repair, parse and filter one feed body. Items missing a title, link or
/// date are dropped.
pub fn articles_from_document(source: &FeedSource, body: &str) -> Result<Vec<RawArticle>> {
    let repaired = repair_ampersands(body);
    let items = parse_feed(&repaired)?;
    counter!("feed_items_total").increment(items.len() as u64);

    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let (Some(title), Some(link), Some(published_at)) = (it.title, it.link, it.published)
        else {
            continue;
        };
        if !is_relevant(source, &title, it.snippet.as_deref()) {
            continue;
        }
        out.push(RawArticle {
            title,
            link,
            published_at,
            source: source.source.clone(),
            snippet: it.snippet,
        });
    }
    Ok(out)
}

/// Stable sort, newest first; unparsable dates go last.
pub fn sort_newest_first(articles: &mut [RawArticle]) {
    articles.sort_by_key(|a| Reverse(parse_published(&a.published_at).unwrap_or(i64::MIN)));
}

/// Fetch every source one after another. A failing source is logged and
/// skipped; it never aborts the batch.
pub async fn fetch_all(provider: &dyn SourceProvider, sources: &[FeedSource]) -> Vec<RawArticle> {
    let mut all = Vec::new();
    for source in sources {
        let result = match provider.fetch_document(source).await {
            Ok(body) => articles_from_document(source, &body),
            Err(e) => Err(e),
        };
        match result {
            Ok(mut items) => {
                info!(target: "ingest", source = %source.source, kept = items.len(), "feed parsed");
                counter!("feed_items_kept_total").increment(items.len() as u64);
                all.append(&mut items);
            }
            Err(e) => {
                warn!(target: "ingest", error = ?e, source = %source.source, provider = provider.name(), "Error fetching feed");
                counter!("feed_fetch_errors_total").increment(1);
            }
        }
    }
    sort_newest_first(&mut all);
    all
}
