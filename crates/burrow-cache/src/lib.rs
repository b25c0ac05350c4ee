//! URL cache backends and the cache-aside policy in front of them.

pub mod layer;
pub mod moka;
pub mod redis;

pub use burrow_core::{CacheError, UrlCache};
pub use layer::CacheLayer;
pub use self::moka::{MokaUrlCache, MokaUrlCacheSettings};
pub use self::redis::RedisUrlCache;
