use burrow_core::{ShortCode, UrlCache};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Best-effort access to a [`UrlCache`].
///
/// Backend failures never reach the caller: a failed read is a miss, a failed
/// write is dropped, and a failed invalidation is logged so the durable
/// delete behind it can go ahead.
#[derive(Debug)]
pub struct CacheLayer<C> {
    cache: Arc<C>,
}

impl<C> Clone for CacheLayer<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<C: UrlCache> CacheLayer<C> {
    pub fn new(cache: C) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    pub fn inner(&self) -> &C {
        &self.cache
    }

    /// Returns the cached URL. `Some` is a hit.
    pub async fn get(&self, code: &ShortCode) -> Option<String> {
        match self.cache.get_url(code).await {
            Ok(Some(url)) => {
                debug!(code = %code, "Cache hit");
                Some(url)
            }
            Ok(None) => {
                trace!(code = %code, "Cache miss");
                None
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    pub async fn set(&self, code: &ShortCode, original_url: &str, ttl: Duration) {
        if let Err(e) = self.cache.set_url(code, original_url, ttl).await {
            warn!(code = %code, error = %e, "Failed to populate cache");
        }
    }

    /// Drops the entry for `code`. Returns `false` if the backend failed, in
    /// which case a stale entry may be served until its TTL runs out.
    pub async fn invalidate(&self, code: &ShortCode) -> bool {
        match self.cache.del(code).await {
            Ok(()) => {
                trace!(code = %code, "Invalidated cache entry");
                true
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Failed to invalidate cache entry");
                false
            }
        }
    }
}
