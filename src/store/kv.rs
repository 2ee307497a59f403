// src/store/kv.rs
//! Remote key-value backend speaking the Upstash / Vercel KV REST protocol.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::{decode_list, ArticleStore};
use crate::article::EnrichedArticle;
use crate::config::KvConfig;

pub struct KvStore {
    http: reqwest::Client,
    cfg: KvConfig,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl KvStore {
    pub fn new(cfg: KvConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .context("building kv http client")?;
        Ok(Self { http, cfg })
    }

    fn url(&self, op: &str) -> String {
        format!("{}/{}/{}", self.cfg.url, op, self.cfg.key)
    }

    async fn call(&self, req: reqwest::RequestBuilder, what: &str) -> Result<Value> {
        let resp = req
            .bearer_auth(&self.cfg.token)
            .send()
            .await
            .with_context(|| format!("kv {what}"))?;
        let status = resp.status();
        let env: Envelope = resp
            .json()
            .await
            .with_context(|| format!("kv {what}: decoding envelope (status {status})"))?;
        if let Some(err) = env.error {
            return Err(anyhow!("kv {what} failed: {err}"));
        }
        if !status.is_success() {
            return Err(anyhow!("kv {what} failed with status {}", status.as_u16()));
        }
        Ok(env.result)
    }
}

/// The stored value is normally a JSON string; some clients store the
/// array inline.
pub(crate) fn decode_result(result: Value) -> Vec<EnrichedArticle> {
    match result {
        Value::Null => Vec::new(),
        Value::String(s) => decode_list(&s, "kv"),
        other => decode_list(&other.to_string(), "kv"),
    }
}

#[async_trait]
impl ArticleStore for KvStore {
    async fn load(&self) -> Result<Vec<EnrichedArticle>> {
        let result = self.call(self.http.get(self.url("get")), "get").await?;
        Ok(decode_result(result))
    }

    async fn save(&self, items: &[EnrichedArticle]) -> Result<()> {
        let body = serde_json::to_string(items).context("serializing news")?;
        self.call(self.http.post(self.url("set")).body(body), "set")
            .await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "kv"
    }
}
