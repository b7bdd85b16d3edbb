//! Minimal IRC wire types for the SASL relay.
//!
//! This crate covers exactly the protocol surface the relay speaks: the
//! client-facing `AUTHENTICATE` exchange and its result numerics, and the
//! server-facing encapsulation envelope used to carry `SASL`, `SVSLOGIN`
//! and `MECHLIST` payloads between the daemon and its services peer.
//!
//! Two message representations are provided:
//!
//! - [`Message`]: owned, for construction and outbound serialization.
//! - [`MessageRef`]: zero-copy, borrowing from the transport buffer, for
//!   inbound dispatch.

pub mod borrowed;
pub mod command;
pub mod error;
pub mod message;
pub mod prefix;
pub mod response;

pub use borrowed::MessageRef;
pub use command::Command;
pub use error::MessageParseError;
pub use message::{Message, Tag};
pub use prefix::Prefix;
pub use response::Response;
