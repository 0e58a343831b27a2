// src/core/storage/db/core.rs

use super::shard::DbShard;
use bytes::Bytes;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

/// The number of shards per database.
pub const NUM_SHARDS: usize = 16;

/// `Db` represents a single keyspace, composed of multiple `DbShard`s.
///
/// Sharding narrows lock contention; the observable semantics are those of a
/// single map, because every read-modify-write on a key happens under that
/// key's shard lock.
#[derive(Debug)]
pub struct Db {
    /// The collection of shards that make up this database.
    shards: Vec<Arc<DbShard>>,
}

impl Db {
    pub fn new() -> Self {
        let shards = (0..NUM_SHARDS).map(|_| Arc::new(DbShard::new())).collect();
        Self { shards }
    }

    /// Calculates the shard index for a given key using hashing.
    pub fn get_shard_index(&self, key: &Bytes) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % NUM_SHARDS
    }

    /// Gets a reference to a shard by its index.
    pub fn get_shard(&self, index: usize) -> &Arc<DbShard> {
        &self.shards[index]
    }
}

impl Default for Db {
    fn default() -> Self {
        Self::new()
    }
}
