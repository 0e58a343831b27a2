// src/core/commands/list/lrange.rs

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::{extract_bytes, extract_string, validate_arg_count};
use crate::core::protocol::RespFrame;
use crate::core::storage::data_types::DataValue;
use crate::core::storage::db::ExecutionContext;
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, Default)]
pub struct LRange {
    pub key: Bytes,
    pub start: i64,
    pub stop: i64,
}

impl ParseCommand for LRange {
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError> {
        validate_arg_count(args, 3, "LRANGE")?;
        Ok(LRange {
            key: extract_bytes(&args[0])?,
            start: extract_string(&args[1])?
                .parse()
                .map_err(|_| CitrineError::NotAnInteger)?,
            stop: extract_string(&args[2])?
                .parse()
                .map_err(|_| CitrineError::NotAnInteger)?,
        })
    }
}

#[async_trait]
impl ExecutableCommand for LRange {
    async fn execute<'a>(
        &self,
        ctx: &mut ExecutionContext<'a>,
    ) -> Result<RespValue, CitrineError> {
        let guard = ctx.get_single_shard_context_mut()?;

        let Some(entry) = guard.peek_live(&self.key) else {
            return Ok(RespValue::Array(vec![]));
        };
        let DataValue::List(list) = &entry.data else {
            return Err(CitrineError::WrongType);
        };

        let len = list.len() as i64;
        if len == 0 {
            return Ok(RespValue::Array(vec![]));
        }

        // Negative indices count back from the tail; resolved bounds are
        // clamped into the list.
        let start = if self.start < 0 {
            len + self.start
        } else {
            self.start
        };
        let stop = if self.stop < 0 {
            len + self.stop
        } else {
            self.stop
        };
        let start = start.max(0);
        let stop = stop.min(len - 1);
        if start > stop || start >= len {
            return Ok(RespValue::Array(vec![]));
        }

        let values = list
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .cloned()
            .map(RespValue::BulkString)
            .collect();
        Ok(RespValue::Array(values))
    }
}
