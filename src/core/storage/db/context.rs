// src/core/storage/db/context.rs

use super::core::Db;
use super::locking::ExecutionLocks;
use super::shard::ShardCache;
use crate::core::state::ServerState;
use crate::core::{CitrineError, Command};
use std::sync::Arc;
use tokio::sync::MutexGuard;

/// `ExecutionContext` provides all the state and locks required to execute a `Command`.
pub struct ExecutionContext<'a> {
    pub state: Arc<ServerState>,
    pub locks: ExecutionLocks<'a>,
    pub db: &'a Db,
    /// The command being executed. Keeping it in the context makes the lock
    /// helpers self-contained.
    pub command: Option<Command>,
    pub session_id: u64,
}

impl<'a> ExecutionContext<'a> {
    /// A helper to get the shard guard for a single-key command from the context.
    pub fn get_single_shard_context_mut(
        &mut self,
    ) -> Result<&mut MutexGuard<'a, ShardCache>, CitrineError> {
        // Get the key directly from the command stored in the context.
        let key = self
            .command
            .as_ref()
            .and_then(|c| c.get_keys().into_iter().next())
            .ok_or_else(|| {
                CitrineError::Internal(
                    "Command in context has no keys for single shard lookup.".into(),
                )
            })?;
        let shard_index = self.db.get_shard_index(&key);
        match &mut self.locks {
            ExecutionLocks::Single { guard, .. } => Ok(guard),
            ExecutionLocks::Multi { guards } => guards
                .get_mut(&shard_index)
                .ok_or_else(|| CitrineError::Internal("Required shard lock missing.".into())),
            ExecutionLocks::None => Err(CitrineError::Internal(
                "Command expected a single/multi shard lock.".into(),
            )),
        }
    }

    /// Releases all locks held by the context. Blocking commands call this
    /// before parking on their rendezvous so no shard stays locked across a
    /// suspension point.
    pub fn release_locks(&mut self) {
        self.locks = ExecutionLocks::None;
    }
}
