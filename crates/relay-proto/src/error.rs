//! Protocol parse errors.

use thiserror::Error;

/// Errors produced while parsing an IRC line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageParseError {
    #[error("empty message")]
    EmptyMessage,

    #[error("missing command")]
    MissingCommand,

    #[error("invalid command: {0}")]
    InvalidCommand(String),
}
