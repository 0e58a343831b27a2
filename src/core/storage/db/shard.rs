// src/core/storage/db/shard.rs

//! Defines the `DbShard` and `ShardCache` structs, which form the fundamental
//! storage units within a `Db`.

use crate::core::CitrineError;
use crate::core::storage::data_types::StoredValue;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// A `DbShard` is a single, concurrent slice of the database. It contains a
/// mutex-guarded `ShardCache`; holding that guard is what makes a command's
/// read-modify-write atomic with respect to every other operation on the
/// shard's keys.
#[derive(Debug, Default)]
pub struct DbShard {
    /// The actual key-value store, protected by a Mutex for thread-safe access.
    pub entries: Mutex<ShardCache>,
}

impl DbShard {
    pub(super) fn new() -> Self {
        Self::default()
    }
}

/// A `ShardCache` wraps the underlying map and exposes the keyspace
/// primitives: plain reads and writes, plus the closure-based
/// read-modify-write pair `update` / `set_or_update` that command handlers
/// use to mutate a value in place under the shard lock.
///
/// TTL purge is lazy: an expired entry stays in the map until an accessor
/// observes it, at which point it is deleted and reported as absent. All
/// accessors here apply that rule, so command handlers never see an expired
/// value.
#[derive(Debug, Default)]
pub struct ShardCache {
    store: HashMap<Bytes, StoredValue>,
}

impl ShardCache {
    /// Deletes the entry under `key` if its expiry has lapsed.
    fn purge_if_expired(&mut self, key: &Bytes) {
        if self.store.get(key).is_some_and(StoredValue::is_expired) {
            self.store.remove(key);
        }
    }

    /// Gets an immutable reference to a live value, purging an expired one.
    pub fn peek_live(&mut self, key: &Bytes) -> Option<&StoredValue> {
        self.purge_if_expired(key);
        self.store.get(key)
    }

    /// Gets a mutable reference to a live value, purging an expired one.
    pub fn get_mut(&mut self, key: &Bytes) -> Option<&mut StoredValue> {
        self.purge_if_expired(key);
        self.store.get_mut(key)
    }

    /// Puts a key-value pair into the shard, replacing any existing value and
    /// its expiry. Returns the old value if the key already existed.
    pub fn put(&mut self, key: Bytes, value: StoredValue) -> Option<StoredValue> {
        self.store.insert(key, value)
    }

    /// Removes a key from the shard, returning the value if the key was present.
    pub fn pop(&mut self, key: &Bytes) -> Option<StoredValue> {
        self.store.remove(key)
    }

    /// Runs `f` against the value stored under `key`.
    ///
    /// Fails with `KeyNotFound` if the key is absent (or expired). `f` must
    /// validate (for example the value's type) before mutating, so that an
    /// `Err` return leaves the value observably unchanged.
    pub fn update<R>(
        &mut self,
        key: &Bytes,
        f: impl FnOnce(&mut StoredValue) -> Result<R, CitrineError>,
    ) -> Result<R, CitrineError> {
        self.purge_if_expired(key);
        let value = self.store.get_mut(key).ok_or(CitrineError::KeyNotFound)?;
        f(value)
    }

    /// Runs `f` against the value stored under `key`, installing `init()`
    /// first if the key is absent (or expired).
    pub fn set_or_update<R>(
        &mut self,
        key: &Bytes,
        init: impl FnOnce() -> StoredValue,
        f: impl FnOnce(&mut StoredValue) -> Result<R, CitrineError>,
    ) -> Result<R, CitrineError> {
        self.purge_if_expired(key);
        let value = self.store.entry(key.clone()).or_insert_with(init);
        f(value)
    }
}
