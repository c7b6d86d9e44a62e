//! Error types for the protocol layer.
//!
//! Every variant describes a malformed command: the line could not be
//! turned into a [`ClientCommand`](crate::ClientCommand) or
//! [`ServerCommand`](crate::ServerCommand). These are always recoverable;
//! the server answers them with an `error` command carrying
//! [`ErrorCode::UnknownCommand`] and keeps the connection open.

use crate::ErrorCode;

/// Errors that can occur while decoding a command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The line was empty (or only a line terminator).
    #[error("empty command")]
    Empty,

    /// The first field is not a keyword of this protocol direction.
    #[error("unknown command `{0}`")]
    UnknownKeyword(String),

    /// The keyword is known but the number of arguments is wrong.
    #[error("`{keyword}` expects {expected} arguments, got {got}")]
    Arity {
        keyword: &'static str,
        expected: &'static str,
        got: usize,
    },

    /// An argument that must be an integer is not one.
    #[error("`{keyword}`: `{value}` is not a valid integer")]
    NotAnInteger {
        keyword: &'static str,
        value: String,
    },

    /// An `error` command carried a code outside the fixed table.
    #[error("unknown error code {0}")]
    UnknownErrorCode(i64),
}

impl ProtocolError {
    /// The protocol error code used to report this failure to a peer.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::UnknownCommand
    }
}
