// src/core/commands/streams/xread.rs

//! Implements the `XREAD` command for reading entries from one or more streams.
//!
//! `XREAD [BLOCK ms] STREAMS key1 … keyN id1 … idN` returns, per key, the
//! entries strictly newer than the given id. In blocking mode an empty result
//! parks the client on a watermarked waiter per key; the first qualifying
//! `XADD` delivers its entry directly and the reply carries that single
//! `[key, [entry]]` group.

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::{extract_bytes, extract_string};
use crate::core::commands::streams::format_entry;
use crate::core::protocol::RespFrame;
use crate::core::storage::data_types::DataValue;
use crate::core::storage::db::{ExecutionContext, ExecutionLocks};
use crate::core::storage::stream::{StreamEntry, StreamId};
use crate::core::stream_blocking::StreamBlockerResult;
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Represents the starting id for an XREAD on a specific stream.
#[derive(Debug, Clone, PartialEq)]
pub enum XReadIdSpec {
    /// An exact id (e.g., "12345-0"): read entries strictly newer than it.
    Exact(StreamId),
    /// The stream's current tail (`$`): only entries appended after this call.
    Last,
}

/// The parsed `XREAD` command.
#[derive(Debug, Clone, Default)]
pub struct XRead {
    pub streams: Vec<(Bytes, XReadIdSpec)>,
    pub block_timeout: Option<Duration>,
}

impl ParseCommand for XRead {
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError> {
        let mut cmd = XRead::default();
        let mut i = 0;

        // Parse optional arguments preceding the STREAMS keyword.
        let mut saw_streams = false;
        while i < args.len() {
            let arg_str = extract_string(&args[i])?;
            match arg_str.to_ascii_lowercase().as_str() {
                "block" => {
                    i += 1;
                    if i >= args.len() {
                        return Err(CitrineError::SyntaxError);
                    }
                    let ms: u64 = extract_string(&args[i])?.parse()?;
                    cmd.block_timeout = Some(if ms == 0 {
                        Duration::from_secs(u64::MAX)
                    } else {
                        Duration::from_millis(ms)
                    });
                    i += 1;
                }
                "streams" => {
                    i += 1;
                    saw_streams = true;
                    break;
                }
                _ => return Err(CitrineError::SyntaxError),
            }
        }
        if !saw_streams {
            return Err(CitrineError::WrongArgumentCount("XREAD".to_string()));
        }

        // The rest is `key1 … keyN id1 … idN`.
        let remaining = &args[i..];
        if remaining.is_empty() || !remaining.len().is_multiple_of(2) {
            return Err(CitrineError::WrongArgumentCount("XREAD".to_string()));
        }
        let num_streams = remaining.len() / 2;
        let keys = &remaining[..num_streams];
        let ids = &remaining[num_streams..];

        for (key_frame, id_frame) in keys.iter().zip(ids.iter()) {
            let key = extract_bytes(key_frame)?;
            let id_str = extract_string(id_frame)?;
            let id_spec = if id_str == "$" {
                XReadIdSpec::Last
            } else {
                XReadIdSpec::Exact(id_str.parse::<StreamId>()?)
            };
            cmd.streams.push((key, id_spec));
        }

        Ok(cmd)
    }
}

#[async_trait]
impl ExecutableCommand for XRead {
    async fn execute<'a>(
        &self,
        ctx: &mut ExecutionContext<'a>,
    ) -> Result<RespValue, CitrineError> {
        // --- Phase 1: resolve watermarks and read, all under the locks ---
        let (resolved, results) = self.read_from_streams(ctx)?;

        // If data is found or this is not a blocking call, reply immediately.
        if !results.is_empty() || self.block_timeout.is_none() {
            if results.is_empty() {
                return Ok(RespValue::Null);
            }
            return Ok(Self::format_results(results));
        }

        // --- Phase 2: block until an entry past a watermark arrives ---
        let timeout = self.block_timeout.unwrap();
        let state = ctx.state.clone();
        let block_result = state
            .stream_blocker_manager
            .block_on(ctx, &resolved, timeout)
            .await;

        match block_result {
            StreamBlockerResult::TimedOut => Ok(RespValue::Null),
            StreamBlockerResult::Delivered(delivered) => {
                Ok(Self::format_results(vec![(
                    delivered.key,
                    vec![delivered.entry],
                )]))
            }
        }
    }
}

impl XRead {
    /// Resolves each stream's starting id (`$` becomes the current tail, or
    /// `0-0` for an absent key) and collects the entries newer than it.
    /// Returns the resolved `(key, watermark)` pairs alongside the non-empty
    /// per-key result groups.
    #[allow(clippy::type_complexity)]
    fn read_from_streams(
        &self,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<(Vec<(Bytes, StreamId)>, Vec<(Bytes, Vec<StreamEntry>)>), CitrineError> {
        let mut resolved = Vec::with_capacity(self.streams.len());
        let mut results = Vec::new();

        for (key, id_spec) in &self.streams {
            let shard_index = ctx.db.get_shard_index(key);
            let guard = match &mut ctx.locks {
                ExecutionLocks::Single { guard, .. } => guard,
                ExecutionLocks::Multi { guards } => guards.get_mut(&shard_index).ok_or_else(
                    || CitrineError::Internal("Required shard lock missing for XREAD.".into()),
                )?,
                ExecutionLocks::None => {
                    return Err(CitrineError::Internal("XREAD requires shard locks".into()));
                }
            };

            let stream = match guard.peek_live(key) {
                None => None,
                Some(entry) => match &entry.data {
                    DataValue::Stream(stream) => Some(stream),
                    _ => return Err(CitrineError::WrongType),
                },
            };

            let watermark = match id_spec {
                XReadIdSpec::Exact(id) => *id,
                XReadIdSpec::Last => stream.map(|s| s.last_id).unwrap_or_default(),
            };

            if let Some(stream) = stream {
                let newer = stream.entries_after(watermark);
                if !newer.is_empty() {
                    results.push((key.clone(), newer));
                }
            }
            resolved.push((key.clone(), watermark));
        }

        Ok((resolved, results))
    }

    /// Formats the final result into the nested array structure expected by clients.
    fn format_results(results: Vec<(Bytes, Vec<StreamEntry>)>) -> RespValue {
        let groups = results
            .into_iter()
            .map(|(key, entries)| {
                RespValue::Array(vec![
                    RespValue::BulkString(key),
                    RespValue::Array(entries.iter().map(format_entry).collect()),
                ])
            })
            .collect();
        RespValue::Array(groups)
    }
}
