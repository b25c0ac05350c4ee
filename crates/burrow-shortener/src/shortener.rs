use async_trait::async_trait;
use burrow_core::{ShortCode, ShortLink, ShortenerError};
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, ShortenerError>;

/// Hit count of a live short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCount {
    pub short_code: ShortCode,
    pub count: u64,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a short link for `original_url`.
    async fn shorten(&self, original_url: &str) -> Result<ShortLink>;

    /// Returns the original URL and counts the hit.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;

    /// Returns how many times `code` has been resolved.
    async fn count(&self, code: &ShortCode) -> Result<LinkCount>;

    /// Removes the link, its index entry and any cached copy.
    async fn delete(&self, code: &ShortCode) -> Result<()>;
}
