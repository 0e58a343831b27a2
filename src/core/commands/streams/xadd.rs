// src/core/commands/streams/xadd.rs

//! Implements the `XADD` command for adding entries to a stream.
//!
//! `XADD key <* | ms-* | ms-seq> field value [field value ...]` appends one
//! entry and replies with its resolved id. Id resolution happens inside the
//! keyspace critical section, where the stream's tail and the clock can be
//! read consistently; the append then wakes any blocked `XREAD` clients whose
//! watermark the new entry exceeds, before the lock is released.

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::{extract_bytes, extract_string};
use crate::core::protocol::RespFrame;
use crate::core::storage::data_types::{DataValue, StoredValue};
use crate::core::storage::db::ExecutionContext;
use crate::core::storage::stream::{Stream, StreamEntry, StreamIdSpec};
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone)]
pub struct XAdd {
    pub key: Bytes,
    pub id_spec: StreamIdSpec,
    pub fields: Vec<(Bytes, Bytes)>,
}

impl Default for XAdd {
    fn default() -> Self {
        Self {
            key: Bytes::new(),
            id_spec: StreamIdSpec::Auto,
            fields: Vec::new(),
        }
    }
}

impl ParseCommand for XAdd {
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError> {
        // key, id, and at least one field/value pair.
        if args.len() < 4 {
            return Err(CitrineError::WrongArgumentCount("XADD".to_string()));
        }
        let key = extract_bytes(&args[0])?;
        let id_spec: StreamIdSpec = extract_string(&args[1])?.parse()?;

        let pair_frames = &args[2..];
        if !pair_frames.len().is_multiple_of(2) {
            return Err(CitrineError::WrongArgumentCount("XADD".to_string()));
        }
        let fields = pair_frames
            .chunks_exact(2)
            .map(|chunk| Ok((extract_bytes(&chunk[0])?, extract_bytes(&chunk[1])?)))
            .collect::<Result<_, CitrineError>>()?;

        Ok(XAdd {
            key,
            id_spec,
            fields,
        })
    }
}

#[async_trait]
impl ExecutableCommand for XAdd {
    async fn execute<'a>(
        &self,
        ctx: &mut ExecutionContext<'a>,
    ) -> Result<RespValue, CitrineError> {
        let state = ctx.state.clone();
        let guard = ctx.get_single_shard_context_mut()?;

        let existed = guard.peek_live(&self.key).is_some();
        let result = guard.set_or_update(
            &self.key,
            || StoredValue::new(DataValue::Stream(Stream::new())),
            |stored| {
                let DataValue::Stream(stream) = &mut stored.data else {
                    return Err(CitrineError::WrongType);
                };
                stream.add_entry(self.id_spec, self.fields.clone())
            },
        );

        let new_id = match result {
            Ok(id) => id,
            Err(e) => {
                // A rejected id must not leave a freshly created empty stream behind.
                if !existed {
                    guard.pop(&self.key);
                }
                return Err(e);
            }
        };

        // Hand the new entry to any blocked XREAD clients while the shard
        // lock is still held, so no waiter can register in between.
        let entry = StreamEntry {
            id: new_id,
            fields: self.fields.clone(),
        };
        state.stream_blocker_manager.notify(&self.key, &entry);

        Ok(RespValue::BulkString(new_id.to_string().into()))
    }
}
