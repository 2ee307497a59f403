// src/store/mod.rs
//! Article list persistence behind one capability trait. The backend is
//! chosen once, by [`build_store`], from the storage config.

pub mod file;
pub mod kv;
pub mod memory;

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

use crate::article::EnrichedArticle;
use crate::config::StorageConfig;
pub use file::FileStore;
pub use kv::KvStore;
pub use memory::MemoryStore;

#[async_trait::async_trait]
pub trait ArticleStore: Send + Sync {
    /// Missing or malformed content loads as an empty list. `Err` is kept
    /// for IO/transport failures, where "empty" would be a lie.
    async fn load(&self) -> Result<Vec<EnrichedArticle>>;
    /// Full overwrite of the stored list.
    async fn save(&self, items: &[EnrichedArticle]) -> Result<()>;
    fn backend_name(&self) -> &'static str;
}

pub type DynStore = Arc<dyn ArticleStore>;

pub fn build_store(cfg: &StorageConfig) -> Result<DynStore> {
    match &cfg.kv {
        Some(kv) => {
            info!(target: "store", key = %kv.key, "using KV store");
            Ok(Arc::new(KvStore::new(kv.clone())?))
        }
        None => {
            info!(target: "store", path = %cfg.data_path.display(), "using file store");
            Ok(Arc::new(FileStore::new(cfg.data_path.clone())))
        }
    }
}

/// Shared decode step for persisted documents: bad content is logged and
/// treated as an empty store.
pub(crate) fn decode_list(raw: &str, origin: &str) -> Vec<EnrichedArticle> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<EnrichedArticle>>(raw) {
        Ok(v) => v,
        Err(e) => {
            error!(target: "store", error = %e, origin, "stored news is not valid; starting empty");
            Vec::new()
        }
    }
}
