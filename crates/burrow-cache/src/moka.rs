use async_trait::async_trait;
use burrow_core::cache::Result;
use burrow_core::{ShortCode, UrlCache};
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

/// A cached URL together with the TTL it was written with.
#[derive(Debug, Clone)]
struct CachedUrl {
    original_url: String,
    ttl: Duration,
}

/// Expires every entry after the TTL it was last written with.
struct PerEntryTtl;

impl Expiry<String, CachedUrl> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedUrl,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedUrl,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct MokaUrlCacheSettings {
    /// Maximum number of entries the cache can hold.
    #[builder(default = 10_000)]
    pub max_capacity: u64,
}

impl Default for MokaUrlCacheSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// An in-process cache using Moka.
///
/// Suited to single-node runs and tests. Each entry keeps the TTL passed to
/// [`UrlCache::set_url`], so different callers can cache for different spans.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, CachedUrl>,
}

impl MokaUrlCache {
    /// Creates a cache holding at most 10,000 entries.
    pub fn new() -> Self {
        Self::with_settings(MokaUrlCacheSettings::default())
    }

    pub fn with_settings(settings: MokaUrlCacheSettings) -> Self {
        let cache = Cache::builder()
            .max_capacity(settings.max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }

    /// Number of entries, including ones not yet evicted. Mostly for tests.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        trace!(code = %code, "Fetching URL from Moka cache");

        match self.cache.get(code.as_str()).await {
            Some(cached) => {
                debug!(code = %code, "Cache hit in Moka");
                Ok(Some(cached.original_url))
            }
            None => {
                trace!(code = %code, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, original_url: &str, ttl: Duration) -> Result<()> {
        trace!(code = %code, ttl_ms = ttl.as_millis(), "Storing URL in Moka cache");

        let value = CachedUrl {
            original_url: original_url.to_string(),
            ttl,
        };
        self.cache.insert(code.as_str().to_string(), value).await;
        debug!(code = %code, "Cached URL in Moka");
        Ok(())
    }

    async fn del(&self, code: &ShortCode) -> Result<()> {
        trace!(code = %code, "Removing URL from Moka cache");

        self.cache.invalidate(code.as_str()).await;
        debug!(code = %code, "Removed URL from Moka cache (if present)");
        Ok(())
    }
}
