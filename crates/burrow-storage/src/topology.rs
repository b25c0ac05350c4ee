//! Store topology read from the process environment.
//!
//! Single-pool mode uses `DATABASE_URL`. Split mode is selected as soon as
//! `DATABASE_SHARD_1_URL` is set: shards are numbered from 1 and read until the
//! first missing number, each with an optional replica, and a dedicated
//! `DATABASE_INDEX_URL` is required.

use crate::postgres::PgStore;
use crate::router::{Shard, ShardRouter};
use burrow_core::error::{Result, StorageError};
use std::time::Duration;
use tracing::info;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const DATABASE_INDEX_URL_ENV: &str = "DATABASE_INDEX_URL";

pub fn shard_url_env(number: usize) -> String {
    format!("DATABASE_SHARD_{number}_URL")
}

pub fn replica_url_env(number: usize) -> String {
    format!("DATABASE_SHARD_{number}_REPLICA_URL")
}

/// Builds a topology of connection strings from a variable lookup.
///
/// Empty values count as unset.
pub fn from_lookup<F>(lookup: F) -> Result<ShardRouter<String>>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    let mut shards = Vec::new();
    for number in 1.. {
        let Some(primary) = get(&shard_url_env(number)) else {
            break;
        };
        let shard = match get(&replica_url_env(number)) {
            Some(replica) => Shard::with_replica(primary, replica),
            None => Shard::new(primary),
        };
        shards.push(shard);
    }

    let index = get(DATABASE_INDEX_URL_ENV);

    if shards.is_empty() {
        if index.is_some() {
            return Err(StorageError::Configuration(format!(
                "{DATABASE_INDEX_URL_ENV} is set but {} is not",
                shard_url_env(1)
            )));
        }
        return get(DATABASE_URL_ENV)
            .map(ShardRouter::single)
            .ok_or_else(|| {
                StorageError::Configuration(format!(
                    "set {DATABASE_URL_ENV}, or {} and {DATABASE_INDEX_URL_ENV}",
                    shard_url_env(1)
                ))
            });
    }

    let index = index.ok_or_else(|| {
        StorageError::Configuration(format!(
            "{DATABASE_INDEX_URL_ENV} is required when shards are configured"
        ))
    })?;

    ShardRouter::split(shards, index)
}

/// Reads the topology from the process environment.
pub fn from_env() -> Result<ShardRouter<String>> {
    from_lookup(|name| std::env::var(name).ok())
}

/// Turns a topology of connection strings into lazily connected pools.
pub fn connect_lazy(
    topology: ShardRouter<String>,
    acquire_timeout: Duration,
) -> Result<ShardRouter<PgStore>> {
    let mode = topology.mode();
    let shards = topology.shard_count();
    let router = topology.try_map(|url| PgStore::connect_lazy(&url, acquire_timeout))?;
    info!(%mode, shards, "database pools configured");
    Ok(router)
}
