// src/core/protocol/mod.rs

//! The RESP wire protocol: frame types and the codec that reads and writes
//! them on a socket.

mod resp_frame;
mod resp_value;

pub use resp_frame::{RespFrame, RespFrameCodec};
pub use resp_value::RespValue;
