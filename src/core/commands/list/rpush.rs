// src/core/commands/list/rpush.rs

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::parse_key_and_values;
use crate::core::commands::list::logic::{PushDirection, list_push_logic};
use crate::core::protocol::RespFrame;
use crate::core::storage::db::ExecutionContext;
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, Default)]
pub struct RPush {
    pub key: Bytes,
    pub values: Vec<Bytes>,
}

impl ParseCommand for RPush {
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError> {
        let (key, values) = parse_key_and_values(args, 2, "RPUSH")?;
        Ok(RPush { key, values })
    }
}

#[async_trait]
impl ExecutableCommand for RPush {
    async fn execute<'a>(
        &self,
        ctx: &mut ExecutionContext<'a>,
    ) -> Result<RespValue, CitrineError> {
        let outcome = list_push_logic(ctx, &self.key, &self.values, PushDirection::Right)?;
        // Historical quirk kept on purpose: when at least one value went
        // straight to a blocked client, the reply is the integer 1 rather
        // than the resulting list length.
        if outcome.consumed_by_waiters > 0 {
            Ok(RespValue::Integer(1))
        } else {
            Ok(RespValue::Integer(outcome.len as i64))
        }
    }
}
