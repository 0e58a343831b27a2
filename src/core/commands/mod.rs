// src/core/commands/mod.rs

//! This module defines all supported commands and the central `Command` enum
//! that encapsulates their parsed state. Command names are case-insensitive;
//! a request frame must be an array of bulk strings whose first element is
//! the command name.

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::protocol::RespFrame;
use crate::core::storage::db::ExecutionContext;
use crate::core::{CitrineError, RespValue};
use bytes::Bytes;

pub mod command_trait;
pub mod generic;
pub mod helpers;
pub mod list;
pub mod streams;
pub mod string;

/// The set of commands this server understands, each carrying its parsed
/// arguments.
#[derive(Debug, Clone)]
pub enum Command {
    Ping(generic::Ping),
    Echo(generic::Echo),
    Type(generic::TypeInfo),
    Set(string::Set),
    Get(string::Get),
    RPush(list::RPush),
    LPush(list::LPush),
    LRange(list::LRange),
    LLen(list::LLen),
    LPop(list::LPop),
    BLPop(list::BLPop),
    XAdd(streams::XAdd),
    XRange(streams::XRange),
    XRead(streams::XRead),
}

impl TryFrom<RespFrame> for Command {
    type Error = CitrineError;

    /// Converts a decoded request frame into a parsed command.
    fn try_from(frame: RespFrame) -> Result<Self, Self::Error> {
        let RespFrame::Array(frames) = frame else {
            return Err(CitrineError::SyntaxError);
        };
        let Some((name_frame, args)) = frames.split_first() else {
            return Err(CitrineError::SyntaxError);
        };
        let name_bytes = helpers::extract_bytes(name_frame)?;
        let name = String::from_utf8_lossy(&name_bytes).to_ascii_uppercase();

        let command = match name.as_str() {
            "PING" => Command::Ping(generic::Ping::parse(args)?),
            "ECHO" => Command::Echo(generic::Echo::parse(args)?),
            "TYPE" => Command::Type(generic::TypeInfo::parse(args)?),
            "SET" => Command::Set(string::Set::parse(args)?),
            "GET" => Command::Get(string::Get::parse(args)?),
            "RPUSH" => Command::RPush(list::RPush::parse(args)?),
            "LPUSH" => Command::LPush(list::LPush::parse(args)?),
            "LRANGE" => Command::LRange(list::LRange::parse(args)?),
            "LLEN" => Command::LLen(list::LLen::parse(args)?),
            "LPOP" => Command::LPop(list::LPop::parse(args)?),
            "BLPOP" => Command::BLPop(list::BLPop::parse(args)?),
            "XADD" => Command::XAdd(streams::XAdd::parse(args)?),
            "XRANGE" => Command::XRange(streams::XRange::parse(args)?),
            "XREAD" => Command::XRead(streams::XRead::parse(args)?),
            _ => {
                return Err(CitrineError::UnknownCommand(
                    String::from_utf8_lossy(&name_bytes).to_string(),
                ));
            }
        };
        Ok(command)
    }
}

impl Command {
    /// The lowercase name of the command, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping(_) => "ping",
            Command::Echo(_) => "echo",
            Command::Type(_) => "type",
            Command::Set(_) => "set",
            Command::Get(_) => "get",
            Command::RPush(_) => "rpush",
            Command::LPush(_) => "lpush",
            Command::LRange(_) => "lrange",
            Command::LLen(_) => "llen",
            Command::LPop(_) => "lpop",
            Command::BLPop(_) => "blpop",
            Command::XAdd(_) => "xadd",
            Command::XRange(_) => "xrange",
            Command::XRead(_) => "xread",
        }
    }

    /// The keys this command operates on. The router locks the shards for
    /// exactly these keys before execution.
    pub fn get_keys(&self) -> Vec<Bytes> {
        match self {
            Command::Ping(_) | Command::Echo(_) => vec![],
            Command::Type(cmd) => vec![cmd.key.clone()],
            Command::Set(cmd) => vec![cmd.key.clone()],
            Command::Get(cmd) => vec![cmd.key.clone()],
            Command::RPush(cmd) => vec![cmd.key.clone()],
            Command::LPush(cmd) => vec![cmd.key.clone()],
            Command::LRange(cmd) => vec![cmd.key.clone()],
            Command::LLen(cmd) => vec![cmd.key.clone()],
            Command::LPop(cmd) => vec![cmd.key.clone()],
            Command::BLPop(cmd) => vec![cmd.key.clone()],
            Command::XAdd(cmd) => vec![cmd.key.clone()],
            Command::XRange(cmd) => vec![cmd.key.clone()],
            Command::XRead(cmd) => cmd.streams.iter().map(|(k, _)| k.clone()).collect(),
        }
    }

    /// Dispatches to the command's execution logic.
    pub async fn execute<'a>(
        &self,
        ctx: &mut ExecutionContext<'a>,
    ) -> Result<RespValue, CitrineError> {
        match self {
            Command::Ping(cmd) => cmd.execute(ctx).await,
            Command::Echo(cmd) => cmd.execute(ctx).await,
            Command::Type(cmd) => cmd.execute(ctx).await,
            Command::Set(cmd) => cmd.execute(ctx).await,
            Command::Get(cmd) => cmd.execute(ctx).await,
            Command::RPush(cmd) => cmd.execute(ctx).await,
            Command::LPush(cmd) => cmd.execute(ctx).await,
            Command::LRange(cmd) => cmd.execute(ctx).await,
            Command::LLen(cmd) => cmd.execute(ctx).await,
            Command::LPop(cmd) => cmd.execute(ctx).await,
            Command::BLPop(cmd) => cmd.execute(ctx).await,
            Command::XAdd(cmd) => cmd.execute(ctx).await,
            Command::XRange(cmd) => cmd.execute(ctx).await,
            Command::XRead(cmd) => cmd.execute(ctx).await,
        }
    }
}
