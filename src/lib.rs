//! Server-side SASL relay for an IRC daemon.
//!
//! Bridges the IRCv3 client-facing SASL negotiation (`CAP` + `AUTHENTICATE`,
//! numerics 900/903/904/906) with the encapsulated server-to-server
//! commands (`SASL`, `SVSLOGIN`, `MECHLIST`) exchanged with an external
//! services peer. The relay never interprets SASL payloads; it tracks a
//! bounded table of in-progress negotiations and shuttles opaque data in
//! both directions until services report an outcome.
//!
//! The host daemon's transport, CAP negotiation machinery, and
//! registration pipeline are external collaborators; this crate carries
//! the seams it dispatches through ([`state::Core`], the role-keyed
//! [`handlers::Registry`], [`hooks::HookRegistry`], [`caps::CapRegistry`])
//! and the relay module itself ([`module::SaslModule`]).

pub mod caps;
pub mod config;
pub mod error;
pub mod handlers;
pub mod hooks;
pub mod module;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::{HandlerError, HandlerResult};
pub use module::SaslModule;
pub use state::{Client, ClientId, Core};
