//! Error types for command handling.

use thiserror::Error;

/// Errors that can occur during command handling.
///
/// The relay resolves almost everything locally (numerics to the client,
/// silent drops for malformed services traffic); what remains is surfaced
/// to the dispatcher, which owns the reply policy per source role.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams,
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
