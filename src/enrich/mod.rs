//! Article enrichment: provider abstraction + prompt/parse contract + fallbacks.
//!
//! `Enricher::analyze` never fails. Whatever happens on the wire, the caller
//! gets a result with a non-empty summary and all five analytic fields set.

pub mod gemini;
pub mod prompt;
pub mod reply;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AiConfig;
pub use gemini::GeminiProvider;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// How a result was produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EnrichOutcome {
    Generated,
    Unconfigured,
    Fallback,
}

impl EnrichOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichOutcome::Generated => "generated",
            EnrichOutcome::Unconfigured => "unconfigured",
            EnrichOutcome::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnrichmentResult {
    /// `TITLE: ...` line plus bullet lines.
    pub summary: String,
    pub country: String,
    pub category: String,
    pub reliability: String,
    pub parent_meaning: String,
    pub today_action: String,
    pub outcome: EnrichOutcome,
}

/// Trait object used by the pipeline.
pub trait Enricher: Send + Sync {
    fn analyze<'a>(
        &'a self,
        title: &'a str,
        snippet: &'a str,
        source: &'a str,
    ) -> Pin<Box<dyn Future<Output = EnrichmentResult> + Send + 'a>>;
    fn provider_name(&self) -> &'static str;
}

pub type DynEnricher = Arc<dyn Enricher>;

/// Factory: a real model-backed enricher when a key is configured,
/// otherwise the fixed fallback.
pub fn build_enricher(cfg: &AiConfig) -> DynEnricher {
    match GeminiProvider::from_config(cfg) {
        Some(provider) => Arc::new(ModelEnricher::new(provider)),
        None => {
            warn!(target: "enrich", "GEMINI_API_KEY is not set. Using fallback data.");
            Arc::new(UnconfiguredEnricher)
        }
    }
}

// ------------------------------------------------------------
// Provider abstraction
// ------------------------------------------------------------

/// Low-level text generation call. `None` covers every transport or
/// provider-side failure.
pub trait TextModel: Send + Sync + 'static {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

/// Replies with a fixed text (or nothing). For tests and dry runs.
#[derive(Clone)]
pub struct MockModel {
    pub fixed: Option<String>,
}

impl MockModel {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            fixed: Some(text.into()),
        }
    }

    pub fn failing() -> Self {
        Self { fixed: None }
    }
}

impl TextModel for MockModel {
    fn generate<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { out })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

// ------------------------------------------------------------
// Enrichers
// ------------------------------------------------------------

/// Used when no credential is configured.
pub struct UnconfiguredEnricher;

impl Enricher for UnconfiguredEnricher {
    fn analyze<'a>(
        &'a self,
        title: &'a str,
        _snippet: &'a str,
        _source: &'a str,
    ) -> Pin<Box<dyn Future<Output = EnrichmentResult> + Send + 'a>> {
        Box::pin(async move {
            counter!("enrich_fallback_total", "reason" => "unconfigured").increment(1);
            reply::unconfigured_fallback(title)
        })
    }
    fn provider_name(&self) -> &'static str {
        "unconfigured"
    }
}

/// Prompt -> provider -> JSON reply -> result, with the processing fallback
/// on any failure along the way.
pub struct ModelEnricher<P: TextModel> {
    inner: P,
}

impl<P: TextModel> ModelEnricher<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    async fn analyze_impl(&self, title: &str, snippet: &str, source: &str) -> EnrichmentResult {
        counter!("enrich_calls_total").increment(1);
        let prompt = prompt::build_prompt(title, snippet, source);

        let Some(text) = self.inner.generate(&prompt).await else {
            warn!(target: "enrich", provider = self.inner.name(), %title, "model call failed");
            counter!("enrich_fallback_total", "reason" => "call").increment(1);
            return reply::processing_fallback();
        };

        match reply::parse_reply(&text) {
            Ok(parsed) => {
                info!(target: "enrich", provider = self.inner.name(), %title, "article analyzed");
                parsed.into_result(title)
            }
            Err(e) => {
                warn!(target: "enrich", error = %e, %title, "model reply not usable");
                counter!("enrich_fallback_total", "reason" => "parse").increment(1);
                reply::processing_fallback()
            }
        }
    }
}

impl<P: TextModel> Enricher for ModelEnricher<P> {
    fn analyze<'a>(
        &'a self,
        title: &'a str,
        snippet: &'a str,
        source: &'a str,
    ) -> Pin<Box<dyn Future<Output = EnrichmentResult> + Send + 'a>> {
        Box::pin(self.analyze_impl(title, snippet, source))
    }
    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}
