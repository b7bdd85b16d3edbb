//! SASL relay module lifecycle.
//!
//! Installs and removes everything the relay contributes to the host:
//! four commands, the `sasl` capability token, and the client-exit hook.

use crate::handlers::{
    AuthenticateHandler, CommandEntry, MechlistHandler, Role, SaslHandler, SvsloginHandler,
};
use crate::hooks::SaslExitHook;
use crate::state::Core;
use std::sync::Arc;
use tracing::info;

/// The capability token the relay advertises.
pub const SASL_CAP: &str = "sasl";

/// Hook name for the relay's client-exit cleanup.
const EXIT_HOOK: &str = "sasl-session-cleanup";

/// The SASL relay module.
pub struct SaslModule;

impl SaslModule {
    /// Install commands, capability, and hooks.
    pub fn init(core: &Arc<Core>) {
        core.registry.add(
            CommandEntry::new("AUTHENTICATE")
                .on(Role::Unregistered, Arc::new(AuthenticateHandler), 1)
                .registered(Role::Client)
                .registered(Role::Oper),
        );
        core.registry.add(
            CommandEntry::new("SASL").on(Role::Encap, Arc::new(SaslHandler), 3),
        );
        core.registry.add(
            CommandEntry::new("SVSLOGIN").on(Role::Encap, Arc::new(SvsloginHandler), 1),
        );
        core.registry.add(
            CommandEntry::new("MECHLIST").on(Role::Encap, Arc::new(MechlistHandler), 0),
        );

        core.caps
            .register(SASL_CAP, Some(core.config.sasl.mechanisms.as_str()));
        core.hooks.install(EXIT_HOOK, Arc::new(SaslExitHook));

        info!(mechanisms = %core.config.sasl.mechanisms, "SASL relay module installed");
    }

    /// Reverse [`init`](SaslModule::init), then zero the session table.
    pub fn exit(core: &Arc<Core>) {
        core.caps.unregister(SASL_CAP);
        core.registry.remove("AUTHENTICATE");
        core.registry.remove("SASL");
        core.registry.remove("SVSLOGIN");
        core.registry.remove("MECHLIST");
        core.hooks.uninstall(EXIT_HOOK);
        core.sessions().reset();

        info!("SASL relay module removed");
    }
}
