//! Daemon-side state: client registry, UID allocation, SASL sessions.

pub mod client;
pub mod core;
pub mod sasl;
pub mod uid;

pub use client::{Client, ClientId, ACCOUNT_LEN, HOST_LEN, USER_LEN};
pub use core::Core;
pub use sasl::{SaslSession, SessionTable, SASL_MAX_FAILURES, SASL_MAX_MESSAGES, SASL_MAX_SESSIONS};
pub use uid::UidAllocator;
