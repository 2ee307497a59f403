// src/pipeline/dedup.rs
use std::collections::HashSet;

use crate::article::EnrichedArticle;
pub use crate::article::article_id;
use crate::ingest::types::RawArticle;

/// Keep the first article for each title. The same story often shows up in
/// several regional variants of one search feed.
pub fn dedup_by_title(fresh: Vec<RawArticle>) -> (Vec<RawArticle>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let before = fresh.len();
    let kept: Vec<RawArticle> = fresh
        .into_iter()
        .filter(|a| !a.title.is_empty() && seen.insert(a.title.clone()))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Fresh articles not represented in `stored`, either by id (link) or by
/// exact title.
pub fn select_unprocessed(fresh: Vec<RawArticle>, stored: &[EnrichedArticle]) -> Vec<RawArticle> {
    let ids: HashSet<&str> = stored.iter().map(|a| a.id.as_str()).collect();
    let titles: HashSet<&str> = stored.iter().map(|a| a.title.as_str()).collect();
    fresh
        .into_iter()
        .filter(|a| !ids.contains(article_id(&a.link).as_str()) && !titles.contains(a.title.as_str()))
        .collect()
}

/// New items first, then the stored list, cut to `retention`.
pub fn merge_and_truncate(
    added: Vec<EnrichedArticle>,
    stored: Vec<EnrichedArticle>,
    retention: usize,
) -> Vec<EnrichedArticle> {
    let mut merged = added;
    merged.extend(stored);
    merged.truncate(retention);
    merged
}
