use crate::router::{Operation, RoutingKey, ShardRouter};
use crate::timeout::bounded;
use burrow_core::error::Result;
use burrow_core::{LinkStore, ShortCode, ShortLink};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// The URL table, partitioned across the router's shards.
#[derive(Debug)]
pub struct LinkRepository<S> {
    router: Arc<ShardRouter<S>>,
    timeout: Duration,
}

impl<S> Clone for LinkRepository<S> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            timeout: self.timeout,
        }
    }
}

impl<S: LinkStore> LinkRepository<S> {
    pub fn new(router: Arc<ShardRouter<S>>, timeout: Duration) -> Self {
        Self { router, timeout }
    }

    pub fn router(&self) -> &ShardRouter<S> {
        &self.router
    }

    /// Writes a new link to the primary of its owning shard.
    pub async fn insert(&self, code: &ShortCode, original_url: &str) -> Result<ShortLink> {
        let store = self.router.route(RoutingKey::Code(code), Operation::Write)?;
        trace!(code = %code, shard = ?self.router.shard_for(code), "Inserting link");

        let link = bounded(self.timeout, "link insert", store.insert_link(code, original_url)).await?;
        debug!(code = %code, id = link.id, "Stored link");
        Ok(link)
    }

    /// Reads a link from its owning shard's replica, or its primary when the
    /// shard has no replica.
    pub async fn get(&self, code: &ShortCode) -> Result<Option<ShortLink>> {
        let store = self.router.route(RoutingKey::Code(code), Operation::Read)?;
        trace!(code = %code, shard = ?self.router.shard_for(code), "Reading link");

        bounded(self.timeout, "link lookup", store.get_link(code)).await
    }

    /// Deletes a link. Returns `true` if it existed.
    pub async fn delete(&self, code: &ShortCode) -> Result<bool> {
        let store = self.router.route(RoutingKey::Code(code), Operation::Write)?;
        let removed = bounded(self.timeout, "link delete", store.delete_link(code)).await?;
        debug!(code = %code, removed, "Deleted link");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::router::Shard;
    use burrow_core::StorageError;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    struct Topology {
        primaries: Vec<InMemoryStore>,
        replica: InMemoryStore,
        repo: LinkRepository<InMemoryStore>,
    }

    /// Two shards; only the first has a replica.
    fn topology() -> Topology {
        let primaries = vec![InMemoryStore::new(), InMemoryStore::new()];
        let replica = InMemoryStore::new();
        let router = ShardRouter::split(
            vec![
                Shard::with_replica(primaries[0].clone(), replica.clone()),
                Shard::new(primaries[1].clone()),
            ],
            InMemoryStore::new(),
        )
        .unwrap();

        Topology {
            primaries,
            replica,
            repo: LinkRepository::new(Arc::new(router), Duration::from_secs(5)),
        }
    }

    #[tokio::test]
    async fn writes_land_on_the_owning_primary() {
        let t = topology();

        for i in 0..32 {
            let c = code(&format!("code{i:04}"));
            t.repo.insert(&c, "https://example.com").await.unwrap();
            let slot = t.repo.router().shard_for(&c).unwrap();
            assert!(t.primaries[slot].get_link(&c).await.unwrap().is_some());
            assert!(t.primaries[1 - slot].get_link(&c).await.unwrap().is_none());
        }
        assert_eq!(t.primaries[0].link_count() + t.primaries[1].link_count(), 32);
        assert_eq!(t.replica.link_count(), 0);
    }

    #[tokio::test]
    async fn reads_use_the_replica_when_configured() {
        let t = topology();

        let mut checked = [false; 2];
        for i in 0..32 {
            let c = code(&format!("code{i:04}"));
            let slot = t.repo.router().shard_for(&c).unwrap();
            t.repo.insert(&c, "https://example.com").await.unwrap();

            let found = t.repo.get(&c).await.unwrap();
            if slot == 0 {
                // the replica has not seen the write
                assert!(found.is_none());
            } else {
                assert_eq!(found.unwrap().short_code, c);
            }
            checked[slot] = true;
        }
        assert!(checked.iter().all(|c| *c));
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let repo = LinkRepository::new(
            Arc::new(ShardRouter::single(InMemoryStore::new())),
            Duration::from_secs(5),
        );
        let c = code("Ab3dEf12");

        repo.insert(&c, "https://example.com").await.unwrap();
        assert!(repo.delete(&c).await.unwrap());
        assert!(!repo.delete(&c).await.unwrap());
        assert!(repo.get(&c).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let repo = LinkRepository::new(
            Arc::new(ShardRouter::single(InMemoryStore::new())),
            Duration::from_secs(5),
        );
        let c = code("Ab3dEf12");

        repo.insert(&c, "https://example.com").await.unwrap();
        let err = repo.insert(&c, "https://example.org").await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn slow_store_times_out() {
        let store = InMemoryStore::new();
        store.set_latency(Duration::from_millis(200));
        let repo = LinkRepository::new(
            Arc::new(ShardRouter::single(store)),
            Duration::from_millis(20),
        );

        let err = repo.get(&code("Ab3dEf12")).await.unwrap_err();
        assert!(matches!(err, StorageError::Timeout(_)));
    }
}
