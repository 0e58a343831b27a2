// src/core/commands/string/set.rs

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::{extract_bytes, extract_string};
use crate::core::protocol::RespFrame;
use crate::core::storage::data_types::{DataValue, StoredValue};
use crate::core::storage::db::ExecutionContext;
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Represents the `SET` command: `SET key value [PX milliseconds]`.
///
/// A plain `SET` overwrites any existing value and clears its TTL; `PX`
/// attaches a millisecond TTL that is purged lazily by later reads.
#[derive(Debug, Clone, Default)]
pub struct Set {
    pub key: Bytes,
    pub value: Bytes,
    pub ttl: Option<Duration>,
}

impl ParseCommand for Set {
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError> {
        if args.len() < 2 {
            return Err(CitrineError::WrongArgumentCount("SET".to_string()));
        }
        let mut cmd = Set {
            key: extract_bytes(&args[0])?,
            value: extract_bytes(&args[1])?,
            ttl: None,
        };

        match args.len() {
            2 => {}
            4 => {
                let option = extract_string(&args[2])?;
                if !option.eq_ignore_ascii_case("px") {
                    return Err(CitrineError::InvalidRequest(format!(
                        "unknown argument: {option}"
                    )));
                }
                let ms: u64 = extract_string(&args[3])?.parse().map_err(|_| {
                    CitrineError::InvalidRequest("expire time couldn't be parsed".to_string())
                })?;
                cmd.ttl = Some(Duration::from_millis(ms));
            }
            _ => return Err(CitrineError::WrongArgumentCount("SET".to_string())),
        }

        Ok(cmd)
    }
}

#[async_trait]
impl ExecutableCommand for Set {
    async fn execute<'a>(
        &self,
        ctx: &mut ExecutionContext<'a>,
    ) -> Result<RespValue, CitrineError> {
        let guard = ctx.get_single_shard_context_mut()?;

        let expiry = self.ttl.map(|ttl| std::time::Instant::now() + ttl);
        guard.put(
            self.key.clone(),
            StoredValue::with_expiry(DataValue::String(self.value.clone()), expiry),
        );

        Ok(RespValue::SimpleString("OK".into()))
    }
}
