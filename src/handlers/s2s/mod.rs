//! Services-originated relay handlers.
//!
//! These commands arrive through the host's encapsulation dispatcher,
//! which has already stripped the `ENCAP` envelope; they are registered
//! for the [`Role::Encap`](crate::handlers::Role::Encap) slot only.

mod mechlist;
mod sasl;
mod svslogin;

pub use mechlist::MechlistHandler;
pub use sasl::SaslHandler;
pub use svslogin::SvsloginHandler;

use crate::module::SASL_CAP;
use crate::state::Core;
use tracing::info;

/// Replace the advertised `sasl` mechanism list.
///
/// An empty or missing list advertises the capability without a value.
pub(crate) fn update_mechanisms(core: &Core, mechs: Option<&str>) {
    core.caps.unregister(SASL_CAP);
    core.caps.register(SASL_CAP, mechs);
    info!(mechanisms = mechs.unwrap_or(""), "SASL mechanism list updated");
}
