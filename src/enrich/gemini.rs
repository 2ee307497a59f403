// src/enrich/gemini.rs
//! Google Generative Language (Gemini) REST provider.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::TextModel;
use crate::config::AiConfig;

/// Medical and developmental topics trip the default filters; relax all four.
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
];

pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    url: String,
}

impl GeminiProvider {
    /// Returns `None` when no key is configured or the client cannot be built.
    pub fn from_config(cfg: &AiConfig) -> Option<Self> {
        let api_key = cfg.api_key.clone()?;
        let http = reqwest::Client::builder()
            .user_agent("asd-news-digest/0.1")
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| warn!(target: "enrich", error = ?e, "gemini http client"))
            .ok()?;
        let url = format!("{}/models/{}:generateContent", cfg.endpoint, cfg.model);
        Some(Self { http, api_key, url })
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}
#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}
#[derive(Serialize)]
struct Safety<'a> {
    category: &'a str,
    threshold: &'a str,
}
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Req<'a> {
    contents: Vec<Content<'a>>,
    safety_settings: Vec<Safety<'a>>,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    candidates: Vec<Candidate>,
}
#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}
#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<RespPart>,
}
#[derive(Deserialize)]
struct RespPart {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate.
fn first_candidate_text(resp: Resp) -> Option<String> {
    let parts = resp.candidates.into_iter().next()?.content?.parts;
    let text: String = parts.into_iter().filter_map(|p| p.text).collect();
    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

impl TextModel for GeminiProvider {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            let req = Req {
                contents: vec![Content {
                    role: "user",
                    parts: vec![Part { text: prompt }],
                }],
                safety_settings: SAFETY_CATEGORIES
                    .iter()
                    .map(|&category| Safety {
                        category,
                        threshold: "BLOCK_NONE",
                    })
                    .collect(),
            };

            let resp = match self
                .http
                .post(&self.url)
                .header("x-goog-api-key", &self.api_key)
                .json(&req)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    warn!(target: "enrich", error = ?e, "gemini request failed");
                    return None;
                }
            };
            if !resp.status().is_success() {
                warn!(target: "enrich", status = resp.status().as_u16(), "gemini non-2xx");
                return None;
            }
            let body: Resp = match resp.json().await {
                Ok(b) => b,
                Err(e) => {
                    warn!(target: "enrich", error = ?e, "gemini body not decodable");
                    return None;
                }
            };
            first_candidate_text(body)
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
