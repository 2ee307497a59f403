// src/ingest/providers.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::collections::HashMap;
use std::time::Duration;

use crate::ingest::types::{FeedSource, SourceProvider};

/// Several feed hosts (Google News in particular) refuse obvious bots.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const FEED_ACCEPT: &str = "application/rss+xml, application/xml, text/xml;q=0.9, */*;q=0.8";

/// Fetches feeds over HTTP with a browser-like identity.
pub struct HttpFeedProvider {
    client: reqwest::Client,
}

impl HttpFeedProvider {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(FEED_ACCEPT));
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("building feed http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SourceProvider for HttpFeedProvider {
    async fn fetch_document(&self, source: &FeedSource) -> Result<String> {
        let resp = self
            .client
            .get(&source.url)
            .send()
            .await
            .with_context(|| format!("GET {}", source.url))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("Status code {}", status.as_u16()));
        }
        resp.text().await.context("reading feed body")
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Serves canned documents keyed by feed URL. A missing URL behaves like
/// an HTTP 404.
#[derive(Debug, Clone, Default)]
pub struct FixtureProvider {
    docs: HashMap<String, String>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.docs.insert(url.into(), body.into());
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, body: impl Into<String>) {
        self.docs.insert(url.into(), body.into());
    }
}

#[async_trait]
impl SourceProvider for FixtureProvider {
    async fn fetch_document(&self, source: &FeedSource) -> Result<String> {
        self.docs
            .get(&source.url)
            .cloned()
            .ok_or_else(|| anyhow!("Status code 404"))
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
