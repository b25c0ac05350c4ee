use crate::window::{window_millis, Result, WindowStore};
use async_trait::async_trait;
use moka::future::Cache;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

type Window = Arc<Mutex<VecDeque<i64>>>;

/// In-process window store for single-node runs and tests.
///
/// Each key holds its timestamps behind its own lock, so the record, prune
/// and count steps for one client never interleave. Idle windows are evicted
/// by Moka's time-to-idle.
#[derive(Debug, Clone)]
pub struct MokaWindowStore {
    windows: Cache<String, Window>,
}

impl MokaWindowStore {
    /// Creates a store whose windows are dropped after `window` plus one
    /// second without events.
    pub fn new(window: Duration) -> Self {
        let windows = Cache::builder()
            .max_capacity(100_000)
            .time_to_idle(window + Duration::from_secs(1))
            .build();
        Self { windows }
    }

    /// Number of tracked clients, including ones not yet evicted.
    pub fn tracked_keys(&self) -> u64 {
        self.windows.entry_count()
    }
}

#[async_trait]
impl WindowStore for MokaWindowStore {
    async fn record_and_count(&self, key: &str, now_ms: i64, window: Duration) -> Result<u64> {
        let entry = self
            .windows
            .get_with(key.to_string(), async { Arc::new(Mutex::new(VecDeque::new())) })
            .await;

        let cutoff = now_ms.saturating_sub(window_millis(window));
        let count = {
            let mut timestamps = entry.lock();
            timestamps.push_back(now_ms);
            // timestamps can arrive slightly out of order across tasks, so
            // prune by value rather than by position
            timestamps.retain(|&ts| ts > cutoff);
            timestamps.len()
        };

        trace!(key, count, "Recorded event in memory window");
        Ok(count as u64)
    }
}
