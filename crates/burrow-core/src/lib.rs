//! Core types and traits for the burrow URL shortener.
//!
//! This crate holds the types shared by the storage, cache, limiter and
//! service crates: short codes, stored rows, the store and cache contracts,
//! and the error taxonomy.

pub mod cache;
pub mod error;
pub mod link;
pub mod shortcode;
pub mod store;

pub use cache::UrlCache;
pub use error::{CacheError, LimiterError, ShortenerError, StorageError};
pub use link::{IndexEntry, ShortLink};
pub use shortcode::ShortCode;
pub use store::{IndexStore, LinkStore, Store};
