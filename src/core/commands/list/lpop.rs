// src/core/commands/list/lpop.rs

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::{extract_bytes, extract_string};
use crate::core::protocol::RespFrame;
use crate::core::storage::data_types::DataValue;
use crate::core::storage::db::ExecutionContext;
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

/// Represents the `LPOP` command: `LPOP key [count]`.
///
/// The bare form pops one item and replies with a single bulk string; the
/// counted form always replies with an array of up to `count` items.
#[derive(Debug, Clone, Default)]
pub struct LPop {
    pub key: Bytes,
    pub count: Option<usize>,
}

impl ParseCommand for LPop {
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError> {
        if args.is_empty() || args.len() > 2 {
            return Err(CitrineError::WrongArgumentCount("LPOP".to_string()));
        }
        let key = extract_bytes(&args[0])?;
        let count = if args.len() == 2 {
            Some(
                extract_string(&args[1])?
                    .parse()
                    .map_err(|_| CitrineError::NotAnInteger)?,
            )
        } else {
            None
        };
        Ok(LPop { key, count })
    }
}

#[async_trait]
impl ExecutableCommand for LPop {
    async fn execute<'a>(
        &self,
        ctx: &mut ExecutionContext<'a>,
    ) -> Result<RespValue, CitrineError> {
        let guard = ctx.get_single_shard_context_mut()?;

        let result = guard.update(&self.key, |stored| {
            let DataValue::List(list) = &mut stored.data else {
                return Err(CitrineError::WrongType);
            };
            let take = self.count.unwrap_or(1).min(list.len());
            Ok(list.drain(..take).collect::<Vec<_>>())
        });

        let popped = match result {
            Ok(popped) => popped,
            Err(CitrineError::KeyNotFound) => return Ok(RespValue::Null),
            Err(e) => return Err(e),
        };

        match self.count {
            // Bare form: a single bulk string, or null on an empty list.
            None => match popped.into_iter().next() {
                Some(value) => Ok(RespValue::BulkString(value)),
                None => Ok(RespValue::Null),
            },
            Some(_) => {
                if popped.is_empty() {
                    return Ok(RespValue::Null);
                }
                Ok(RespValue::Array(
                    popped.into_iter().map(RespValue::BulkString).collect(),
                ))
            }
        }
    }
}
