// tests/integration/test_helpers.rs

//! Test helpers and utilities for integration tests.

use bytes::Bytes;
use citrine::config::Config;
use citrine::core::protocol::RespFrame;
use citrine::core::state::ServerState;
use citrine::core::storage::db::ExecutionContext;
use citrine::core::{CitrineError, Command, RespValue};
use std::sync::Arc;

/// TestContext provides a complete test environment with a real keyspace instance.
#[derive(Clone)]
pub struct TestContext {
    pub state: Arc<ServerState>,
}

impl TestContext {
    /// Creates a new test context with default configuration.
    pub fn new() -> Self {
        Self {
            state: ServerState::new(Config::default()),
        }
    }

    /// Executes a command and returns the response value.
    pub async fn execute(&self, command: Command) -> Result<RespValue, CitrineError> {
        let db = &self.state.db;
        let locks = db.determine_locks_for_command(&command).await;
        let mut ctx = ExecutionContext {
            state: self.state.clone(),
            locks,
            db,
            command: Some(command.clone()),
            // A fixed session id is fine: tests that need several concurrent
            // sessions construct their own contexts.
            session_id: 1,
        };
        command.execute(&mut ctx).await
    }

    /// Builds a command from string parts (name first) and executes it.
    pub async fn cmd(&self, parts: &[&str]) -> Result<RespValue, CitrineError> {
        let frames = parts
            .iter()
            .map(|part| RespFrame::BulkString(Bytes::copy_from_slice(part.as_bytes())))
            .collect();
        let command = Command::try_from(RespFrame::Array(frames))?;
        self.execute(command).await
    }
}

/// Shorthand for the expected bulk-string value in assertions.
pub fn bulk(s: &str) -> RespValue {
    RespValue::BulkString(Bytes::copy_from_slice(s.as_bytes()))
}

/// Shorthand for a `[key, value]`-style array of bulk strings.
pub fn bulk_array(items: &[&str]) -> RespValue {
    RespValue::Array(items.iter().map(|item| bulk(item)).collect())
}
