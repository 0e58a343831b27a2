// src/core/handler/command_router.rs

//! The command router: acquires the locks a command needs, builds its
//! execution context, and runs it.

use crate::core::state::ServerState;
use crate::core::storage::db::ExecutionContext;
use crate::core::{CitrineError, Command, RespValue};
use std::sync::Arc;

/// Executes commands on behalf of one session.
pub struct Router {
    state: Arc<ServerState>,
    session_id: u64,
}

impl Router {
    pub fn new(state: Arc<ServerState>, session_id: u64) -> Self {
        Self { state, session_id }
    }

    /// Acquires the appropriate shard locks for the command's keys, then
    /// executes it. The locks live in the `ExecutionContext` for the duration
    /// of `execute`, which is what makes each handler's read-modify-write
    /// atomic; blocking handlers release them explicitly before parking.
    pub async fn route(&self, command: Command) -> Result<RespValue, CitrineError> {
        let db = &self.state.db;
        let locks = db.determine_locks_for_command(&command).await;
        let mut ctx = ExecutionContext {
            state: self.state.clone(),
            locks,
            db,
            command: Some(command.clone()),
            session_id: self.session_id,
        };
        command.execute(&mut ctx).await
    }
}
