// src/enrich/reply.rs
//! Model reply handling: JSON extraction, summary composition and the two
//! fallback records.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::Value;

use super::{EnrichOutcome, EnrichmentResult};

pub const DEFAULT_COUNTRY: &str = "不明";
pub const DEFAULT_CATEGORY: &str = "研究";
pub const DEFAULT_RELIABILITY: &str = "★★";
const MAX_BULLETS: usize = 3;

/// Reply shape requested by the prompt. Every key is optional, and the text
/// fields take any JSON value, so one missing or mistyped field only
/// defaults that field. `bullets` must be a list of strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelReply {
    pub title_ja: Option<Value>,
    pub bullets: Option<Vec<String>>,
    pub country: Option<Value>,
    pub category: Option<Value>,
    pub reliability: Option<Value>,
    pub parent_meaning: Option<Value>,
    pub today_action: Option<Value>,
}

/// First balanced `{...}` in `text`, skipping braces inside JSON strings.
/// Tolerates markdown fences and chatty preambles around the object.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

pub fn parse_reply(text: &str) -> Result<ModelReply> {
    let json = extract_json_object(text.trim())
        .ok_or_else(|| anyhow!("Valid JSON not found in the response."))?;
    Ok(serde_json::from_str(json)?)
}

/// Non-blank string value, else `default`. Non-string values count as missing.
fn or_default(v: Option<Value>, default: &str) -> String {
    match v {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => default.to_string(),
    }
}

/// `TITLE: ...` followed by up to three `- ` bullet lines.
pub fn compose_summary(title_line: &str, bullets: &[String]) -> String {
    let mut lines = vec![format!("TITLE: {title_line}")];
    lines.extend(
        bullets
            .iter()
            .map(|b| b.trim())
            .filter(|b| !b.is_empty())
            .take(MAX_BULLETS)
            .map(|b| format!("- {b}")),
    );
    lines.join("\n")
}

impl ModelReply {
    pub fn into_result(self, original_title: &str) -> EnrichmentResult {
        let title_line = or_default(self.title_ja, original_title);
        let bullets = self.bullets.unwrap_or_default();
        EnrichmentResult {
            summary: compose_summary(&title_line, &bullets),
            country: or_default(self.country, DEFAULT_COUNTRY),
            category: or_default(self.category, DEFAULT_CATEGORY),
            reliability: or_default(self.reliability, DEFAULT_RELIABILITY),
            parent_meaning: or_default(
                self.parent_meaning,
                "詳細な内容は記事リンクよりご確認ください。",
            ),
            today_action: or_default(
                self.today_action,
                "見出しから気になるポイントをチェックしてみましょう。",
            ),
            outcome: EnrichOutcome::Generated,
        }
    }
}

fn fallback_base(summary: String, outcome: EnrichOutcome) -> EnrichmentResult {
    EnrichmentResult {
        summary,
        country: DEFAULT_COUNTRY.to_string(),
        category: DEFAULT_CATEGORY.to_string(),
        reliability: DEFAULT_RELIABILITY.to_string(),
        parent_meaning: "詳細は元記事をご確認ください。".to_string(),
        today_action: "最新の研究動向に関心を持ち、情報を集めましょう。".to_string(),
        outcome,
    }
}

/// Used when no model credential is configured.
pub fn unconfigured_fallback(title: &str) -> EnrichmentResult {
    fallback_base(
        compose_summary(
            title,
            &[
                "この記事の要約は現在準備中です。".to_string(),
                "詳しくはリンク先の元記事をご覧ください。".to_string(),
                "APIキーが設定されていない可能性があります。".to_string(),
            ],
        ),
        EnrichOutcome::Unconfigured,
    )
}

/// Used when the call or the parse failed. Worded as "still processing"
/// rather than as an error.
pub fn processing_fallback() -> EnrichmentResult {
    fallback_base(
        compose_summary(
            "英語見出しのため準備中",
            &[
                "こちらの記事は現在、日本語への翻訳・要約処理を行っています。".to_string(),
                "しばらく経ってから「今すぐ更新」を押すか、リンク先の元記事をご確認ください。"
                    .to_string(),
            ],
        ),
        EnrichOutcome::Fallback,
    )
}
