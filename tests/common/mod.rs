//! Shared harness for relay integration tests.
//!
//! Drives the relay through its dispatch surface the way the host daemon
//! would: client lines arrive under the unregistered role, services lines
//! under the encap role with a server source. Outbound traffic is
//! collected from the per-client queues and the services link.

#![allow(dead_code)] // not every test file uses every helper

use ircd_sasl_relay::handlers::{Role, Source};
use ircd_sasl_relay::state::ClientId;
use ircd_sasl_relay::{Config, Core, SaslModule};
use relay_proto::Message;
use std::sync::Arc;
use tokio::sync::mpsc;

/// SID of the simulated services server.
pub const SERVICES_SID: &str = "9SS";
/// Agent UID used by most tests.
pub const AGENT: &str = "9SSAAAAAA";

/// An in-process network: this server plus a captured services link.
pub struct TestNet {
    pub core: Arc<Core>,
    link_rx: mpsc::Receiver<Message>,
}

/// A simulated local client connection.
pub struct TestClient {
    pub id: ClientId,
    rx: mpsc::Receiver<Message>,
}

pub fn test_config() -> Config {
    toml::from_str(
        r#"
        [server]
        name = "irc.example.net"
        sid = "00A"
        network = "ExampleNet"
        "#,
    )
    .expect("test config parses")
}

impl TestNet {
    /// Build a core with the SASL module installed.
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();

        let (core, link_rx) = Core::new(test_config());
        SaslModule::init(&core);
        Self { core, link_rx }
    }

    /// Attach a local client that has negotiated the `sasl` capability
    /// and already provided NICK/USER (the usual CAP-negotiation order).
    pub async fn connect_client(&self, nick: &str, user: &str) -> TestClient {
        let (id, rx) = self.core.attach_local_client("host.example", "192.0.2.7");
        let client = self.core.client(id).expect("client just attached");
        {
            let mut client = client.write().await;
            client.caps.insert("sasl".to_string());
            client.nick = Some(nick.to_string());
            client.username = user.to_string();
        }
        TestClient { id, rx }
    }

    /// Attach a local client that did not request the `sasl` capability.
    pub async fn connect_client_without_sasl(&self) -> TestClient {
        let (id, rx) = self.core.attach_local_client("host.example", "192.0.2.7");
        TestClient { id, rx }
    }

    /// Dispatch one line as if typed by an unregistered local client.
    pub async fn client_line(&self, client: &TestClient, line: &str) {
        self.core
            .dispatch_line(Role::Unregistered, Source::Client(client.id), line)
            .await;
    }

    /// Dispatch one line from the services server, post-encapsulation.
    pub async fn services_line(&self, line: &str) {
        self.core
            .dispatch_line(Role::Encap, Source::Server(SERVICES_SID.to_string()), line)
            .await;
    }

    /// The UID the relay assigned to a client, if any.
    pub async fn uid_of(&self, client: &TestClient) -> String {
        self.core
            .client(client.id)
            .expect("client exists")
            .read()
            .await
            .uid
            .clone()
    }

    /// Next services-bound line, if one was emitted.
    pub fn try_server_line(&mut self) -> Option<String> {
        self.link_rx.try_recv().ok().map(|msg| msg.to_string())
    }

    /// Next services-bound line; panics if none was emitted.
    pub fn expect_server_line(&mut self) -> String {
        self.try_server_line()
            .expect("expected a services-bound message")
    }

    /// Assert the relay sent nothing further to services.
    pub fn assert_no_server_traffic(&mut self) {
        if let Some(line) = self.try_server_line() {
            panic!("unexpected services-bound message: {line}");
        }
    }
}

impl TestClient {
    /// Next line queued to this client, if any.
    pub fn try_line(&mut self) -> Option<String> {
        self.rx.try_recv().ok().map(|msg| msg.to_string())
    }

    /// Next line queued to this client; panics if none was queued.
    pub fn expect_line(&mut self) -> String {
        self.try_line().expect("expected a client-bound message")
    }

    /// Assert nothing further was queued to this client.
    pub fn assert_no_messages(&mut self) {
        if let Some(line) = self.try_line() {
            panic!("unexpected client-bound message: {line}");
        }
    }
}
