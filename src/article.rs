// src/article.rs
//! The persisted unit: one article plus its generated digest.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::enrich::EnrichmentResult;
use crate::ingest::types::RawArticle;

/// Stable id for a link: standard base64 of its UTF-8 bytes. Ids written
/// by earlier versions of the store use the same encoding.
pub fn article_id(link: &str) -> String {
    STANDARD.encode(link.as_bytes())
}

/// Stored record. Field names on disk keep the historical document keys,
/// and every enrichment field is optional so older records still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedArticle {
    pub id: String,
    pub title: String,
    pub link: String,
    #[serde(rename = "pubDate")]
    pub published_at: String,
    pub source: String,
    #[serde(rename = "contentSnippet", default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(rename = "summary", default)]
    pub summary_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_meaning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today_action: Option<String>,
    #[serde(default)]
    pub fetched_at: String,
}

impl EnrichedArticle {
    pub fn from_parts(raw: RawArticle, enrichment: EnrichmentResult) -> Self {
        Self {
            id: article_id(&raw.link),
            title: raw.title,
            link: raw.link,
            published_at: raw.published_at,
            source: raw.source,
            snippet: raw.snippet,
            summary_text: enrichment.summary,
            country: Some(enrichment.country),
            category: Some(enrichment.category),
            reliability: Some(enrichment.reliability),
            parent_meaning: Some(enrichment.parent_meaning),
            today_action: Some(enrichment.today_action),
            fetched_at: now_iso(),
        }
    }
}

/// `2025-06-10T08:00:00.123Z`
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
