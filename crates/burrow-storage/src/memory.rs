use async_trait::async_trait;
use burrow_core::error::{Result, StorageError};
use burrow_core::{IndexEntry, IndexStore, LinkStore, ShortCode, ShortLink};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory implementation of both store tables using DashMap.
///
/// Clones share the same tables, so one instance can be handed to a router
/// and still be inspected by the caller. Failures and latency can be injected
/// to exercise retry, timeout and fail-open paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    links: DashMap<String, ShortLink>,
    index: DashMap<String, u64>,
    next_id: AtomicI64,
    faults: Faults,
}

#[derive(Debug, Default)]
struct Faults {
    fail_next: AtomicUsize,
    unavailable: AtomicBool,
    latency_ms: AtomicU64,
}

impl InMemoryStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` operations fail with [`StorageError::Unavailable`].
    pub fn fail_next(&self, count: usize) {
        self.inner.faults.fail_next.store(count, Ordering::SeqCst);
    }

    /// Makes every operation fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner
            .faults
            .unavailable
            .store(unavailable, Ordering::SeqCst);
    }

    /// Delays every operation by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.inner.faults.latency_ms.store(millis, Ordering::SeqCst);
    }

    /// Number of rows in the URL table.
    pub fn link_count(&self) -> usize {
        self.inner.links.len()
    }

    /// Number of rows in the index table.
    pub fn entry_count(&self) -> usize {
        self.inner.index.len()
    }

    async fn check(&self, operation: &str) -> Result<()> {
        let latency = self.inner.faults.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.inner.faults.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!(
                "{operation}: store is down"
            )));
        }

        let injected = self
            .inner
            .faults
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StorageError::Unavailable(format!(
                "{operation}: injected failure"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl LinkStore for InMemoryStore {
    async fn insert_link(&self, code: &ShortCode, original_url: &str) -> Result<ShortLink> {
        self.check("insert link").await?;

        match self.inner.links.entry(code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(code.to_string())),
            Entry::Vacant(slot) => {
                let link = ShortLink {
                    id: self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                    short_code: code.clone(),
                    original_url: original_url.to_owned(),
                };
                slot.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn get_link(&self, code: &ShortCode) -> Result<Option<ShortLink>> {
        self.check("get link").await?;
        Ok(self.inner.links.get(code.as_str()).map(|e| e.clone()))
    }

    async fn delete_link(&self, code: &ShortCode) -> Result<bool> {
        self.check("delete link").await?;
        Ok(self.inner.links.remove(code.as_str()).is_some())
    }
}

#[async_trait]
impl IndexStore for InMemoryStore {
    async fn entry_exists(&self, code: &ShortCode) -> Result<bool> {
        self.check("check index entry").await?;
        Ok(self.inner.index.contains_key(code.as_str()))
    }

    async fn insert_entry(&self, code: &ShortCode) -> Result<()> {
        self.check("insert index entry").await?;

        match self.inner.index.entry(code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(code.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(0);
                Ok(())
            }
        }
    }

    async fn increment_hits(&self, code: &ShortCode) -> Result<bool> {
        self.check("increment hits").await?;

        match self.inner.index.get_mut(code.as_str()) {
            Some(mut count) => {
                *count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_entry(&self, code: &ShortCode) -> Result<Option<IndexEntry>> {
        self.check("get index entry").await?;

        Ok(self
            .inner
            .index
            .get(code.as_str())
            .map(|count| IndexEntry {
                short_code: code.clone(),
                hit_count: *count,
            }))
    }

    async fn delete_entry(&self, code: &ShortCode) -> Result<bool> {
        self.check("delete index entry").await?;
        Ok(self.inner.index.remove(code.as_str()).is_some())
    }
}
