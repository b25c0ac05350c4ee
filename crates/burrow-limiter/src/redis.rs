use crate::window::{window_millis, Result, WindowStore};
use async_trait::async_trait;
use burrow_core::LimiterError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{trace, warn};

/// Adds the event, trims the window, counts what is left and refreshes the
/// key expiry. Runs atomically on the server.
///
/// KEYS[1] window key, ARGV[1] now in ms, ARGV[2] window in ms, ARGV[3] member.
const RECORD_AND_COUNT: &str = r#"
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
redis.call('ZADD', KEYS[1], now, ARGV[3])
redis.call('ZREMRANGEBYSCORE', KEYS[1], 0, now - window)
local count = redis.call('ZCARD', KEYS[1])
redis.call('PEXPIRE', KEYS[1], window + 1000)
return count
"#;

/// Window store on Redis sorted sets, shared by every gateway instance.
#[derive(Clone)]
pub struct RedisWindowStore {
    conn: redis::aio::MultiplexedConnection,
    script: Arc<redis::Script>,
    sequence: Arc<AtomicU64>,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> LimiterError {
    let message = format!("{operation}: {err}");
    let lower = message.to_ascii_lowercase();
    if lower.contains("timed out") {
        LimiterError::Timeout(message)
    } else if lower.contains("connection refused") || lower.contains("broken pipe") {
        LimiterError::Unavailable(message)
    } else {
        LimiterError::Operation(message)
    }
}

impl RedisWindowStore {
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self {
            conn,
            script: Arc::new(redis::Script::new(RECORD_AND_COUNT)),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| LimiterError::Unavailable(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        Ok(Self::new(conn))
    }

    /// Sorted set members must be unique, or two events in the same
    /// millisecond would collapse into one.
    fn member(&self, now_ms: i64) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{now_ms}-{}-{sequence}", std::process::id())
    }
}

#[async_trait]
impl WindowStore for RedisWindowStore {
    async fn record_and_count(&self, key: &str, now_ms: i64, window: Duration) -> Result<u64> {
        let member = self.member(now_ms);
        let mut conn = self.conn.clone();

        let count: u64 = self
            .script
            .key(key)
            .arg(now_ms)
            .arg(window_millis(window))
            .arg(member)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                warn!(key, error = %e, "Redis error on window update");
                map_redis_error("failed to update rate window", e)
            })?;

        trace!(key, count, "Recorded event in Redis window");
        Ok(count)
    }
}
