use crate::router::{Operation, RoutingKey, ShardRouter};
use crate::settings::{ExistencePolicy, StorageSettings};
use crate::timeout::bounded;
use burrow_core::error::Result;
use burrow_core::{IndexStore, ShortCode, StorageError};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Uniqueness and hit-count bookkeeping on the dedicated index store.
///
/// The registry is the source of truth for whether a short code is taken.
/// Every call is bounded by [`StorageSettings::operation_timeout`].
#[derive(Debug)]
pub struct IndexRegistry<S> {
    router: Arc<ShardRouter<S>>,
    settings: StorageSettings,
}

impl<S> Clone for IndexRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            settings: self.settings.clone(),
        }
    }
}

impl<S: IndexStore> IndexRegistry<S> {
    pub fn new(router: Arc<ShardRouter<S>>, settings: StorageSettings) -> Self {
        Self { router, settings }
    }

    pub fn settings(&self) -> &StorageSettings {
        &self.settings
    }

    fn store(&self, operation: Operation) -> Result<&S> {
        self.router.route(RoutingKey::Index, operation)
    }

    /// Checks whether `code` is registered.
    ///
    /// When the index store fails, the answer depends on the configured
    /// [`ExistencePolicy`].
    pub async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let store = self.store(Operation::Read)?;
        let result = bounded(
            self.settings.operation_timeout,
            "index existence check",
            store.entry_exists(code),
        )
        .await;

        match (result, self.settings.existence_policy) {
            (Ok(found), _) => {
                trace!(code = %code, found, "Index existence check");
                Ok(found)
            }
            (Err(e), ExistencePolicy::FailOpen) => {
                warn!(code = %code, error = %e, "Index existence check failed, treating code as absent");
                Ok(false)
            }
            (Err(e), ExistencePolicy::FailClosed) => Err(e),
        }
    }

    /// Inserts an entry with a zero hit count.
    ///
    /// Failed attempts are retried immediately until
    /// [`StorageSettings::register_attempts`] is used up; the error of the
    /// last attempt is returned. A conflict on the first attempt means the
    /// code is taken and is returned as is. A conflict on a later attempt
    /// means an earlier attempt committed before it failed, so the entry is
    /// ours.
    pub async fn register(&self, code: &ShortCode) -> Result<()> {
        let store = self.store(Operation::Write)?;
        let attempts = self.settings.register_attempts.max(1);
        let mut attempt = 1;

        loop {
            let result = bounded(
                self.settings.operation_timeout,
                "index registration",
                store.insert_entry(code),
            )
            .await;

            match result {
                Ok(()) => {
                    debug!(code = %code, attempt, "Registered short code in index");
                    return Ok(());
                }
                Err(StorageError::Conflict(_)) if attempt > 1 => {
                    debug!(code = %code, attempt, "Index entry committed by an earlier attempt");
                    return Ok(());
                }
                Err(e @ StorageError::Conflict(_)) => return Err(e),
                Err(e) if attempt < attempts => {
                    warn!(code = %code, attempt, attempts, error = %e, "Index registration failed, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    warn!(code = %code, attempts, error = %e, "Index registration failed, giving up");
                    return Err(e);
                }
            }
        }
    }

    /// Adds one to the hit count of `code`. Returns `false` when `code` has
    /// no entry.
    pub async fn increment(&self, code: &ShortCode) -> Result<bool> {
        let store = self.store(Operation::Write)?;
        let incremented = bounded(
            self.settings.operation_timeout,
            "hit count increment",
            store.increment_hits(code),
        )
        .await?;
        trace!(code = %code, incremented, "Hit count increment");
        Ok(incremented)
    }

    /// Removes the entry for `code`. Returns `true` if it existed.
    pub async fn unregister(&self, code: &ShortCode) -> Result<bool> {
        let store = self.store(Operation::Write)?;
        let removed = bounded(
            self.settings.operation_timeout,
            "index removal",
            store.delete_entry(code),
        )
        .await?;
        debug!(code = %code, removed, "Removed short code from index");
        Ok(removed)
    }

    /// Current hit count of `code`, or `None` when it is not registered.
    pub async fn count(&self, code: &ShortCode) -> Result<Option<u64>> {
        let store = self.store(Operation::Read)?;
        let entry = bounded(
            self.settings.operation_timeout,
            "hit count lookup",
            store.get_entry(code),
        )
        .await?;
        Ok(entry.map(|entry| entry.hit_count))
    }
}
