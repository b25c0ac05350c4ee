use crate::error::Result;
use crate::link::{IndexEntry, ShortLink};
use crate::shortcode::ShortCode;
use async_trait::async_trait;

/// The URL table of a single store.
#[async_trait]
pub trait LinkStore: Send + Sync + 'static {
    /// Inserts a new link and returns it with its generated id.
    /// Returns `Err(Conflict)` if the code is already present in this store.
    async fn insert_link(&self, code: &ShortCode, original_url: &str) -> Result<ShortLink>;

    /// Retrieves the link for a given short code.
    /// Returns `None` if the code does not exist.
    async fn get_link(&self, code: &ShortCode) -> Result<Option<ShortLink>>;

    /// Deletes the link for a given short code.
    /// Returns `true` if the row existed and was removed.
    async fn delete_link(&self, code: &ShortCode) -> Result<bool>;
}

/// The index table of a single store.
///
/// Only the store chosen as the index shard ever receives these calls.
#[async_trait]
pub trait IndexStore: Send + Sync + 'static {
    /// Checks whether an index entry exists for the code.
    async fn entry_exists(&self, code: &ShortCode) -> Result<bool>;

    /// Inserts an entry with a zero hit count.
    /// Returns `Err(Conflict)` if the entry already exists.
    async fn insert_entry(&self, code: &ShortCode) -> Result<()>;

    /// Adds one to the hit count. Returns `false` if there is no entry.
    async fn increment_hits(&self, code: &ShortCode) -> Result<bool>;

    /// Retrieves the entry for a code.
    async fn get_entry(&self, code: &ShortCode) -> Result<Option<IndexEntry>>;

    /// Deletes the entry. Returns `true` if it existed.
    async fn delete_entry(&self, code: &ShortCode) -> Result<bool>;
}

/// A backing store that carries both tables.
pub trait Store: LinkStore + IndexStore {}

impl<T: LinkStore + IndexStore> Store for T {}
