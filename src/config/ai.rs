// src/config/ai.rs
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiConfig {
    /// `None` means enrichment runs in fallback-only mode.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL without the `/models/...` suffix.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
        }
    }
}

impl AiConfig {
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self {
            api_key: get("GEMINI_API_KEY").and_then(non_blank),
            ..Self::default()
        };
        if let Some(m) = get("GEMINI_MODEL").and_then(non_blank) {
            cfg.model = m;
        }
        if let Some(e) = get("GEMINI_ENDPOINT").and_then(non_blank) {
            cfg.endpoint = e.trim_end_matches('/').to_string();
        }
        cfg
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

pub(crate) fn non_blank(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}
