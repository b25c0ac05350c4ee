//! Durable storage for burrow: the URL table partitioned across shards, the
//! index table on its dedicated store, and the router that picks between them.

pub mod links;
pub mod memory;
pub mod postgres;
pub mod registry;
pub mod router;
pub mod settings;
pub mod timeout;
pub mod topology;

pub use links::LinkRepository;
pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use registry::IndexRegistry;
pub use router::{Operation, RouterMode, RoutingKey, Shard, ShardRouter};
pub use settings::{ExistencePolicy, StorageSettings};
