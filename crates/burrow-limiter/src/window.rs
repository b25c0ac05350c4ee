use async_trait::async_trait;
use burrow_core::LimiterError;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, LimiterError>;

/// Backend holding one sliding window of event timestamps per key.
#[async_trait]
pub trait WindowStore: Send + Sync + 'static {
    /// Records an event at `now_ms`, drops events at or before
    /// `now_ms - window`, and returns how many events are left, including the
    /// new one.
    ///
    /// The three steps run as one atomic operation per key. The window is
    /// reclaimed after `window` plus one second without events.
    async fn record_and_count(&self, key: &str, now_ms: i64, window: Duration) -> Result<u64>;
}

/// Milliseconds in `window`, saturating at `i64::MAX`.
pub(crate) fn window_millis(window: Duration) -> i64 {
    i64::try_from(window.as_millis()).unwrap_or(i64::MAX)
}
