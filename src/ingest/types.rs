// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One configured feed endpoint. Immutable once the config is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedSource {
    pub url: String,
    /// Display name stored on every article from this feed.
    pub source: String,
    /// Topic-specific feed: exempt from keyword filtering.
    #[serde(default)]
    pub dedicated: bool,
}

impl FeedSource {
    pub fn new(url: impl Into<String>, source: impl Into<String>, dedicated: bool) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
            dedicated,
        }
    }
}

/// Article as read from a feed, before enrichment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawArticle {
    pub title: String,
    pub link: String,
    /// Date string exactly as the feed published it.
    pub published_at: String,
    pub source: String,
    pub snippet: Option<String>,
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    /// Return the raw document body for one feed. Non-2xx is an error.
    async fn fetch_document(&self, source: &FeedSource) -> Result<String>;
    fn name(&self) -> &'static str;
}
