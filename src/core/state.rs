// src/core/state.rs

//! Defines the central `ServerState` struct, holding all shared server-wide state.

use crate::config::Config;
use crate::core::blocking::BlockerManager;
use crate::core::storage::db::Db;
use crate::core::stream_blocking::StreamBlockerManager;
use std::sync::Arc;

/// The central struct holding all shared, server-wide state.
///
/// One instance exists per server process, wrapped in an `Arc` and handed to
/// every connection task. Tests construct their own instance; there is no
/// process-wide singleton keyspace.
#[derive(Debug)]
pub struct ServerState {
    /// The keyspace, sharded internally.
    pub db: Db,
    /// The server's runtime configuration.
    pub config: Config,
    /// Manages clients blocked on list commands (`BLPOP`).
    pub blocker_manager: Arc<BlockerManager>,
    /// Manages clients blocked on stream commands (`XREAD BLOCK`).
    pub stream_blocker_manager: Arc<StreamBlockerManager>,
}

impl ServerState {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            db: Db::new(),
            config,
            blocker_manager: Arc::new(BlockerManager::new()),
            stream_blocker_manager: Arc::new(StreamBlockerManager::new()),
        })
    }
}
