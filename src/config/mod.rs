//! Process configuration, built once at startup and passed down explicitly.
//!
//! Nothing below `pipeline`, `enrich` or `store` reads the environment; the
//! binaries call [`AppConfig::from_env`] and hand the pieces to the factories.

pub mod ai;
pub mod feeds;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ingest::types::FeedSource;
use ai::non_blank;
pub use ai::AiConfig;

pub const DEFAULT_DATA_PATH: &str = "data/news.json";
pub const DEFAULT_KV_KEY: &str = "asd_news";
pub const DEFAULT_MAX_PER_CYCLE: usize = 10;
pub const DEFAULT_DELAY_MS: u64 = 4_500;
pub const DEFAULT_RETENTION: usize = 50;
pub const DEFAULT_DAILY_HOUR: u32 = 9;

/// Remote key-value store credentials (Upstash / Vercel KV REST).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KvConfig {
    pub url: String,
    pub token: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    pub data_path: PathBuf,
    /// When present the KV backend is used and `data_path` is ignored.
    pub kv: Option<KvConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            kv: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateConfig {
    pub max_per_cycle: usize,
    pub delay_ms: u64,
    pub retention: usize,
    /// Local hour for the built-in daily run; `None` disables it.
    pub daily_hour: Option<u32>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            max_per_cycle: DEFAULT_MAX_PER_CYCLE,
            delay_ms: DEFAULT_DELAY_MS,
            retention: DEFAULT_RETENTION,
            daily_hour: Some(DEFAULT_DAILY_HOUR),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggerConfig {
    pub update_password: Option<String>,
    pub cron_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub ai: AiConfig,
    pub storage: StorageConfig,
    pub update: UpdateConfig,
    pub trigger: TriggerConfig,
    pub feeds: Vec<FeedSource>,
}

impl AppConfig {
    /// Read the process environment. Call `dotenvy::dotenv()` first if a
    /// `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let feeds_path = get(feeds::ENV_FEEDS_PATH).and_then(non_blank);
        let feeds = feeds::load_feeds(feeds_path.as_deref())?;
        Ok(Self {
            ai: AiConfig::from_lookup(&get),
            storage: storage_from(&get),
            update: update_from(&get),
            trigger: TriggerConfig {
                update_password: get("UPDATE_PASSWORD").and_then(non_blank),
                cron_secret: get("CRON_SECRET").and_then(non_blank),
            },
            feeds,
        })
    }
}

fn storage_from<F>(get: &F) -> StorageConfig
where
    F: Fn(&str) -> Option<String>,
{
    let data_path = get("NEWS_DATA_PATH")
        .and_then(non_blank)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
    let url = get("KV_REST_API_URL").and_then(non_blank);
    let token = get("KV_REST_API_TOKEN").and_then(non_blank);
    let kv = match (url, token) {
        (Some(url), Some(token)) => Some(KvConfig {
            url: url.trim_end_matches('/').to_string(),
            token,
            key: get("KV_NEWS_KEY")
                .and_then(non_blank)
                .unwrap_or_else(|| DEFAULT_KV_KEY.to_string()),
        }),
        _ => None,
    };
    StorageConfig { data_path, kv }
}

fn update_from<F>(get: &F) -> UpdateConfig
where
    F: Fn(&str) -> Option<String>,
{
    let d = UpdateConfig::default();
    let daily_hour = match get("UPDATE_SCHEDULE_HOUR").and_then(non_blank) {
        Some(v) if v.eq_ignore_ascii_case("off") => None,
        Some(v) => Some(
            v.parse::<u32>()
                .ok()
                .filter(|h| *h < 24)
                .unwrap_or(DEFAULT_DAILY_HOUR),
        ),
        None => d.daily_hour,
    };
    UpdateConfig {
        max_per_cycle: positive_or(get("UPDATE_MAX_ARTICLES"), d.max_per_cycle),
        delay_ms: parse_or(get("UPDATE_DELAY_MS"), d.delay_ms),
        retention: positive_or(get("NEWS_RETENTION"), d.retention),
        daily_hour,
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|s| s.trim().parse::<T>().ok()).unwrap_or(default)
}

/// Like `parse_or`, but zero also falls back to the default.
fn positive_or(raw: Option<String>, default: usize) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[serial_test::serial]
    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.update, UpdateConfig::default());
        assert_eq!(cfg.storage.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert!(cfg.storage.kv.is_none());
        assert!(!cfg.ai.is_configured());
        assert_eq!(cfg.trigger, TriggerConfig::default());
    }

    #[serial_test::serial]
    #[test]
    fn kv_needs_both_url_and_token() {
        let only_url = AppConfig::from_lookup(lookup(&[("KV_REST_API_URL", "https://kv.example")]))
            .unwrap();
        assert!(only_url.storage.kv.is_none());

        let both = AppConfig::from_lookup(lookup(&[
            ("KV_REST_API_URL", "https://kv.example/"),
            ("KV_REST_API_TOKEN", "t"),
        ]))
        .unwrap();
        let kv = both.storage.kv.unwrap();
        assert_eq!(kv.url, "https://kv.example");
        assert_eq!(kv.key, DEFAULT_KV_KEY);
    }

    #[serial_test::serial]
    #[test]
    fn update_knobs_parse_with_fallbacks() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("UPDATE_MAX_ARTICLES", "3"),
            ("UPDATE_DELAY_MS", "oops"),
            ("NEWS_RETENTION", "20"),
            ("UPDATE_SCHEDULE_HOUR", "off"),
        ]))
        .unwrap();
        assert_eq!(cfg.update.max_per_cycle, 3);
        assert_eq!(cfg.update.delay_ms, DEFAULT_DELAY_MS);
        assert_eq!(cfg.update.retention, 20);
        assert_eq!(cfg.update.daily_hour, None);

        let zeros = AppConfig::from_lookup(lookup(&[
            ("UPDATE_MAX_ARTICLES", "0"),
            ("NEWS_RETENTION", "0"),
            ("UPDATE_DELAY_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(zeros.update.max_per_cycle, DEFAULT_MAX_PER_CYCLE);
        assert_eq!(zeros.update.retention, DEFAULT_RETENTION);
        assert_eq!(zeros.update.delay_ms, 0);

        let bad_hour =
            AppConfig::from_lookup(lookup(&[("UPDATE_SCHEDULE_HOUR", "31")])).unwrap();
        assert_eq!(bad_hour.update.daily_hour, Some(DEFAULT_DAILY_HOUR));
    }
}
