// src/store/memory.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;

use super::ArticleStore;
use crate::article::EnrichedArticle;

/// In-process store for tests and dry runs. Can be told to fail writes.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<Vec<EnrichedArticle>>,
    saves: Mutex<usize>,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<EnrichedArticle>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Vec<EnrichedArticle> {
        self.items.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|g| *g).unwrap_or_default()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn load(&self) -> Result<Vec<EnrichedArticle>> {
        Ok(self.snapshot())
    }

    async fn save(&self, items: &[EnrichedArticle]) -> Result<()> {
        if self.fail_saves {
            return Err(anyhow!("memory store: write refused"));
        }
        let mut g = self.items.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        *g = items.to_vec();
        drop(g);
        if let Ok(mut n) = self.saves.lock() {
            *n += 1;
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
