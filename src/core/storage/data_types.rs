// src/core/storage/data_types.rs

//! Defines the core data structures for storing values in the database,
//! such as `StoredValue` and the `DataValue` enum.

use crate::core::storage::stream::Stream;
use bytes::Bytes;
use std::collections::VecDeque;
use std::time::Instant;

/// A wrapper for all values stored in the database, containing the data and metadata.
#[derive(Debug, Clone)]
pub struct StoredValue {
    pub data: DataValue,
    /// The time at which the value expires. Only `SET ... PX` produces one;
    /// lists and streams never carry an expiry.
    pub expiry: Option<Instant>,
}

impl StoredValue {
    /// Creates a new `StoredValue` with no expiry.
    pub fn new(data: DataValue) -> Self {
        Self { data, expiry: None }
    }

    /// Creates a new `StoredValue` with an expiry instant.
    pub fn with_expiry(data: DataValue, expiry: Option<Instant>) -> Self {
        Self { data, expiry }
    }

    /// Checks if the value is expired. Purging is the caller's job: expired
    /// entries stay in the map until a read observes them.
    pub fn is_expired(&self) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= Instant::now())
    }
}

/// An enum representing the different data types that can be stored.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    String(Bytes),
    List(VecDeque<Bytes>),
    Stream(Stream),
}

impl DataValue {
    /// The type name reported by the `TYPE` command.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::String(_) => "string",
            DataValue::List(_) => "list",
            DataValue::Stream(_) => "stream",
        }
    }
}
