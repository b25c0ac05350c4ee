use crate::error::CacheError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, CacheError>;

/// A cache mapping short codes to original URLs.
///
/// Implementations can use Redis, in-memory caches, or other storage
/// backends. A miss never means the link is gone.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get the original URL from cache.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Store the original URL, expiring after `ttl`.
    async fn set_url(&self, code: &ShortCode, original_url: &str, ttl: Duration) -> Result<()>;

    /// Remove the entry. It is not an error if the key does not exist.
    async fn del(&self, code: &ShortCode) -> Result<()>;
}

#[async_trait]
impl<T: UrlCache + ?Sized> UrlCache for Arc<T> {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        (**self).get_url(code).await
    }

    async fn set_url(&self, code: &ShortCode, original_url: &str, ttl: Duration) -> Result<()> {
        (**self).set_url(code, original_url, ttl).await
    }

    async fn del(&self, code: &ShortCode) -> Result<()> {
        (**self).del(code).await
    }
}
