use std::sync::Arc;
use std::time::Duration;

use burrow_limiter::{ManualClock, RateLimitSettings, RateLimiter, RedisWindowStore, WindowStore};
use burrow_test_infra::redis::RedisServer;
use jiff::{SignedDuration, Timestamp};
use redis::AsyncCommands;

const WINDOW: Duration = Duration::from_secs(30);

#[tokio::test]
#[ignore = "requires a running docker daemon"]
async fn script_records_prunes_and_expires() {
    let server = RedisServer::new().await.expect("start redis");
    let conn = server.connection().await.expect("redis connection");
    let store = RedisWindowStore::new(conn.clone());

    assert_eq!(store.record_and_count("w", 0, WINDOW).await.unwrap(), 1);
    // same millisecond, distinct member
    assert_eq!(store.record_and_count("w", 0, WINDOW).await.unwrap(), 2);
    assert_eq!(store.record_and_count("w", 10_000, WINDOW).await.unwrap(), 3);
    // everything at or before 0 is trimmed
    assert_eq!(store.record_and_count("w", 30_000, WINDOW).await.unwrap(), 2);

    let mut conn = conn.clone();
    let pttl: i64 = conn.pttl("w").await.unwrap();
    assert!(pttl > 30_000 && pttl <= 31_000, "unexpected pttl {pttl}");
}

#[tokio::test]
#[ignore = "requires a running docker daemon"]
async fn limiter_over_redis() {
    let server = RedisServer::new().await.expect("start redis");
    let conn = server.connection().await.expect("redis connection");
    let clock = ManualClock::new(Timestamp::now());
    let limiter = RateLimiter::with_clock(
        Arc::new(RedisWindowStore::new(conn)),
        Arc::new(clock.clone()),
        RateLimitSettings::default(),
    );

    for _ in 0..5 {
        assert!(limiter.admit("203.0.113.7").await);
    }
    assert!(!limiter.admit("203.0.113.7").await);

    clock.advance(SignedDuration::from_secs(31));
    assert!(limiter.admit("203.0.113.7").await);
}
