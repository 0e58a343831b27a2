// src/core/commands/streams/xrange.rs

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::{extract_bytes, extract_string, validate_arg_count};
use crate::core::commands::streams::format_entry;
use crate::core::protocol::RespFrame;
use crate::core::storage::data_types::DataValue;
use crate::core::storage::db::ExecutionContext;
use crate::core::storage::stream::StreamId;
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, Default)]
pub struct XRange {
    pub key: Bytes,
    pub start: StreamId,
    pub end: StreamId,
}

fn parse_range_boundary(s: &str) -> Result<StreamId, CitrineError> {
    if s == "-" {
        Ok(StreamId::MIN)
    } else if s == "+" {
        Ok(StreamId::MAX)
    } else {
        s.parse::<StreamId>()
    }
}

impl ParseCommand for XRange {
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError> {
        validate_arg_count(args, 3, "XRANGE")?;
        Ok(XRange {
            key: extract_bytes(&args[0])?,
            start: parse_range_boundary(&extract_string(&args[1])?)?,
            end: parse_range_boundary(&extract_string(&args[2])?)?,
        })
    }
}

#[async_trait]
impl ExecutableCommand for XRange {
    async fn execute<'a>(
        &self,
        ctx: &mut ExecutionContext<'a>,
    ) -> Result<RespValue, CitrineError> {
        let guard = ctx.get_single_shard_context_mut()?;

        let Some(entry) = guard.peek_live(&self.key) else {
            return Ok(RespValue::Array(vec![]));
        };
        let DataValue::Stream(stream) = &entry.data else {
            return Err(CitrineError::WrongType);
        };

        let results = stream
            .range(self.start, self.end)
            .iter()
            .map(format_entry)
            .collect();
        Ok(RespValue::Array(results))
    }
}
