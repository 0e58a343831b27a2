// src/core/errors.rs

//! Defines the primary error type for the entire application.

use std::num::{ParseFloatError, ParseIntError};
use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing all possible failures within the server.
///
/// The `Display` output of a variant is exactly the text a client receives
/// after the `-` marker on the wire, so the message formats here are part of
/// the protocol surface.
#[derive(Error, Debug)]
pub enum CitrineError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    /// Sentinel used by the codec when a frame is not yet complete in the
    /// read buffer. Never sent to a client.
    #[error("Incomplete data in stream")]
    IncompleteData,

    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),

    #[error("ERR syntax error")]
    SyntaxError,

    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArgumentCount(String),

    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,

    #[error("ERR value is not a valid float")]
    NotAFloat,

    #[error("ERR {0}")]
    InvalidRequest(String),

    #[error("Key not found")]
    KeyNotFound,

    #[error("ERR The ID specified in XADD must be greater than 0-0")]
    StreamIdZero,

    #[error("ERR The ID specified in XADD is equal or smaller than the target stream top item")]
    StreamIdTooSmall,

    #[error("ERR Invalid stream ID specified as stream command argument")]
    InvalidStreamId,

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

// Manual implementation of Clone because `std::io::Error` is not cloneable.
// We wrap it in an Arc to allow for cheap, shared cloning.
impl Clone for CitrineError {
    fn clone(&self) -> Self {
        match self {
            CitrineError::Io(e) => CitrineError::Io(Arc::clone(e)),
            CitrineError::IncompleteData => CitrineError::IncompleteData,
            CitrineError::UnknownCommand(s) => CitrineError::UnknownCommand(s.clone()),
            CitrineError::SyntaxError => CitrineError::SyntaxError,
            CitrineError::WrongArgumentCount(s) => CitrineError::WrongArgumentCount(s.clone()),
            CitrineError::WrongType => CitrineError::WrongType,
            CitrineError::NotAnInteger => CitrineError::NotAnInteger,
            CitrineError::NotAFloat => CitrineError::NotAFloat,
            CitrineError::InvalidRequest(s) => CitrineError::InvalidRequest(s.clone()),
            CitrineError::KeyNotFound => CitrineError::KeyNotFound,
            CitrineError::StreamIdZero => CitrineError::StreamIdZero,
            CitrineError::StreamIdTooSmall => CitrineError::StreamIdTooSmall,
            CitrineError::InvalidStreamId => CitrineError::InvalidStreamId,
            CitrineError::Internal(s) => CitrineError::Internal(s.clone()),
        }
    }
}

impl PartialEq for CitrineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CitrineError::Io(e1), CitrineError::Io(e2)) => e1.to_string() == e2.to_string(),
            (CitrineError::UnknownCommand(s1), CitrineError::UnknownCommand(s2)) => s1 == s2,
            (CitrineError::WrongArgumentCount(s1), CitrineError::WrongArgumentCount(s2)) => {
                s1 == s2
            }
            (CitrineError::InvalidRequest(s1), CitrineError::InvalidRequest(s2)) => s1 == s2,
            (CitrineError::Internal(s1), CitrineError::Internal(s2)) => s1 == s2,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

// --- From trait implementations for easy error conversion ---

impl From<std::io::Error> for CitrineError {
    fn from(e: std::io::Error) -> Self {
        CitrineError::Io(Arc::new(e))
    }
}

impl From<std::string::FromUtf8Error> for CitrineError {
    fn from(_: std::string::FromUtf8Error) -> Self {
        CitrineError::WrongType
    }
}

impl From<ParseIntError> for CitrineError {
    fn from(_: ParseIntError) -> Self {
        CitrineError::NotAnInteger
    }
}

impl From<ParseFloatError> for CitrineError {
    fn from(_: ParseFloatError) -> Self {
        CitrineError::NotAFloat
    }
}
