use burrow_core::error::{Result, StorageError};
use burrow_core::ShortCode;
use sha2::{Digest, Sha256};
use std::fmt::{Display, Formatter};

/// The kind of access a caller is about to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

/// The value a store is selected by.
#[derive(Debug, Clone, Copy)]
pub enum RoutingKey<'a> {
    /// Link rows are partitioned by their short code.
    Code(&'a ShortCode),
    /// Index bookkeeping always lands on the dedicated index store.
    Index,
}

/// One partition of the URL table: a write store and an optional read replica.
#[derive(Debug, Clone)]
pub struct Shard<S> {
    pub primary: S,
    pub replica: Option<S>,
}

impl<S> Shard<S> {
    pub fn new(primary: S) -> Self {
        Self {
            primary,
            replica: None,
        }
    }

    pub fn with_replica(primary: S, replica: S) -> Self {
        Self {
            primary,
            replica: Some(replica),
        }
    }

    fn for_operation(&self, operation: Operation) -> &S {
        match (operation, &self.replica) {
            (Operation::Read, Some(replica)) => replica,
            _ => &self.primary,
        }
    }
}

/// How the router was configured at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterMode {
    SinglePool,
    ReadWriteSplit,
}

impl Display for RouterMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterMode::SinglePool => write!(f, "single-pool"),
            RouterMode::ReadWriteSplit => write!(f, "read-write-split"),
        }
    }
}

/// Selects the backing store for a routing key.
///
/// The variant is chosen once from configuration and never changes while the
/// process runs. Partitioning is static: a code is hashed with SHA-256 and the
/// first digest byte, modulo the shard count, picks the shard. Changing the
/// number of shards moves codes between shards and needs a manual migration.
///
/// # Example
///
/// ```rust
/// use burrow_core::ShortCode;
/// use burrow_storage::router::{Operation, RoutingKey, Shard, ShardRouter};
///
/// let router = ShardRouter::split(
///     vec![Shard::new("shard-1"), Shard::with_replica("shard-2", "replica-2")],
///     "index",
/// )
/// .unwrap();
///
/// let code = ShortCode::new("Ab3dEf12").unwrap();
/// let write = router.route(RoutingKey::Code(&code), Operation::Write).unwrap();
/// assert!(write.starts_with("shard-"));
/// assert_eq!(*router.route(RoutingKey::Index, Operation::Read).unwrap(), "index");
/// ```
#[derive(Debug, Clone)]
pub enum ShardRouter<S> {
    /// One store serves reads, writes and the index.
    SinglePool(S),
    /// Writes go to a shard primary, reads to its replica when present,
    /// and index operations to a store of their own.
    ReadWriteSplit { shards: Vec<Shard<S>>, index: S },
}

impl<S> ShardRouter<S> {
    pub fn single(store: S) -> Self {
        ShardRouter::SinglePool(store)
    }

    /// Creates a split router. Fails if no shard is given.
    pub fn split(shards: Vec<Shard<S>>, index: S) -> Result<Self> {
        if shards.is_empty() {
            return Err(StorageError::Configuration(
                "no database shards configured".to_string(),
            ));
        }
        Ok(ShardRouter::ReadWriteSplit { shards, index })
    }

    pub fn mode(&self) -> RouterMode {
        match self {
            ShardRouter::SinglePool(_) => RouterMode::SinglePool,
            ShardRouter::ReadWriteSplit { .. } => RouterMode::ReadWriteSplit,
        }
    }

    /// Number of partitions of the URL table.
    pub fn shard_count(&self) -> usize {
        match self {
            ShardRouter::SinglePool(_) => 1,
            ShardRouter::ReadWriteSplit { shards, .. } => shards.len(),
        }
    }

    /// Returns the shard position a code is assigned to.
    pub fn shard_for(&self, code: &ShortCode) -> Option<usize> {
        match self.shard_count() {
            0 => None,
            count => Some(shard_slot(code.as_str(), count)),
        }
    }

    /// Returns the store that must serve `operation` for `key`.
    pub fn route(&self, key: RoutingKey<'_>, operation: Operation) -> Result<&S> {
        match (self, key) {
            (ShardRouter::SinglePool(store), _) => Ok(store),
            (ShardRouter::ReadWriteSplit { index, .. }, RoutingKey::Index) => Ok(index),
            (ShardRouter::ReadWriteSplit { shards, .. }, RoutingKey::Code(code)) => {
                if shards.is_empty() {
                    let pool = match operation {
                        Operation::Read => "read",
                        Operation::Write => "write",
                    };
                    return Err(StorageError::Configuration(format!(
                        "no {pool} pool configured"
                    )));
                }
                let slot = shard_slot(code.as_str(), shards.len());
                Ok(shards[slot].for_operation(operation))
            }
        }
    }

    /// Every distinct handle held by the router, index store last.
    pub fn handles(&self) -> Vec<&S> {
        match self {
            ShardRouter::SinglePool(store) => vec![store],
            ShardRouter::ReadWriteSplit { shards, index } => shards
                .iter()
                .flat_map(|shard| std::iter::once(&shard.primary).chain(shard.replica.as_ref()))
                .chain(std::iter::once(index))
                .collect(),
        }
    }

    /// Handles that accept writes: shard primaries and the index store.
    pub fn writable_handles(&self) -> Vec<&S> {
        match self {
            ShardRouter::SinglePool(store) => vec![store],
            ShardRouter::ReadWriteSplit { shards, index } => shards
                .iter()
                .map(|shard| &shard.primary)
                .chain(std::iter::once(index))
                .collect(),
        }
    }

    /// Converts every handle, keeping the topology. Used to turn connection
    /// strings into live pools.
    pub fn try_map<T, E>(
        self,
        mut f: impl FnMut(S) -> std::result::Result<T, E>,
    ) -> std::result::Result<ShardRouter<T>, E> {
        match self {
            ShardRouter::SinglePool(store) => Ok(ShardRouter::SinglePool(f(store)?)),
            ShardRouter::ReadWriteSplit { shards, index } => {
                let shards = shards
                    .into_iter()
                    .map(|shard| {
                        Ok(Shard {
                            primary: f(shard.primary)?,
                            replica: shard.replica.map(&mut f).transpose()?,
                        })
                    })
                    .collect::<std::result::Result<Vec<_>, E>>()?;
                let index = f(index)?;
                Ok(ShardRouter::ReadWriteSplit { shards, index })
            }
        }
    }
}

/// Maps a key onto `[0, shard_count)` using the first byte of its SHA-256 digest.
///
/// `shard_count` must be non-zero.
pub fn shard_slot(key: &str, shard_count: usize) -> usize {
    let digest = Sha256::digest(key.as_bytes());
    usize::from(digest[0]) % shard_count
}
