// src/pipeline/throttle.rs
//! Rate-limited sequential task runner.
//!
//! Runs at most `max_items` tasks, one at a time, sleeping `delay` between
//! consecutive tasks (never after the last). Whatever is over the cap is
//! reported as deferred and left for the next run.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, d: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, d: Duration) {
        tokio::time::sleep(d).await;
    }
}

/// Records requested sleeps instead of waiting. Clones share the log.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, d: Duration) {
        if let Ok(mut g) = self.calls.lock() {
            g.push(d);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome<R> {
    pub results: Vec<R>,
    /// Items beyond the per-run cap, not attempted.
    pub deferred: usize,
}

pub struct ThrottledRunner {
    delay: Duration,
    max_items: usize,
    sleeper: Arc<dyn Sleeper>,
}

impl ThrottledRunner {
    pub fn new(delay: Duration, max_items: usize) -> Self {
        Self::with_sleeper(delay, max_items, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(delay: Duration, max_items: usize, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            delay,
            max_items,
            sleeper,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Run `task(index, total, item)` over the capped prefix of `items`.
    pub async fn run<T, R, F, Fut>(&self, mut items: Vec<T>, mut task: F) -> RunOutcome<R>
    where
        F: FnMut(usize, usize, T) -> Fut,
        Fut: Future<Output = R>,
    {
        let deferred = items.len().saturating_sub(self.max_items);
        items.truncate(self.max_items);
        let total = items.len();

        let mut results = Vec::with_capacity(total);
        for (i, item) in items.into_iter().enumerate() {
            results.push(task(i, total, item).await);
            if i + 1 < total && !self.delay.is_zero() {
                self.sleeper.sleep(self.delay).await;
            }
        }
        RunOutcome { results, deferred }
    }
}
