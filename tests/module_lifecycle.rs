//! Module install/teardown and role-table behavior.

mod common;

use common::{TestNet, AGENT};
use ircd_sasl_relay::handlers::{Role, Source};
use ircd_sasl_relay::module::SASL_CAP;
use ircd_sasl_relay::SaslModule;

#[tokio::test]
async fn init_advertises_default_mechanisms() {
    let net = TestNet::new();
    assert_eq!(
        net.core.caps.value_of(SASL_CAP),
        Some(Some("PLAIN".to_string()))
    );
    assert_eq!(net.core.caps.ls_tokens(), vec!["sasl=PLAIN".to_string()]);
}

#[tokio::test]
async fn exit_removes_commands_capability_and_sessions() {
    let mut net = TestNet::new();
    let mut client = net.connect_client("sara", "s").await;

    net.client_line(&client, "AUTHENTICATE PLAIN").await;
    net.expect_server_line();
    net.expect_server_line();
    assert_eq!(net.core.sessions().len(), 1);

    SaslModule::exit(&net.core);

    assert_eq!(net.core.caps.value_of(SASL_CAP), None);
    assert!(net.core.sessions().is_empty());

    // The command table no longer knows AUTHENTICATE.
    net.client_line(&client, "AUTHENTICATE PLAIN").await;
    client.assert_no_messages();
    net.assert_no_server_traffic();

    // Exit hooks are gone too: a disconnect emits nothing upstream.
    net.core.client_exited(client.id).await;
    net.assert_no_server_traffic();
}

#[tokio::test]
async fn module_can_be_reinstalled() {
    let mut net = TestNet::new();
    SaslModule::exit(&net.core);
    SaslModule::init(&net.core);

    let client = net.connect_client("tess", "t").await;
    net.client_line(&client, "AUTHENTICATE PLAIN").await;
    assert!(net.expect_server_line().contains(" H "));
    assert!(net.expect_server_line().contains(" S PLAIN"));
}

#[tokio::test]
async fn authenticate_after_registration_is_rejected() {
    let mut net = TestNet::new();
    let mut client = net.connect_client("uma", "u").await;
    net.core
        .client(client.id)
        .unwrap()
        .write()
        .await
        .registered = true;

    net.core
        .dispatch_line(
            Role::Client,
            Source::Client(client.id),
            "AUTHENTICATE PLAIN",
        )
        .await;

    assert_eq!(
        client.expect_line(),
        ":irc.example.net 462 uma :You may not reregister"
    );
    net.assert_no_server_traffic();
}

#[tokio::test]
async fn relay_commands_ignore_wrong_roles() {
    let mut net = TestNet::new();
    let mut client = net.connect_client("vera", "v").await;

    // SASL/SVSLOGIN/MECHLIST only act in the encap role.
    net.core
        .dispatch_line(
            Role::Client,
            Source::Client(client.id),
            &format!("SASL {AGENT} 00AAAAAAA C +"),
        )
        .await;
    net.core
        .dispatch_line(
            Role::Server,
            Source::Server("9SS".to_string()),
            "MECHLIST :EXTERNAL",
        )
        .await;

    client.assert_no_messages();
    assert_eq!(
        net.core.caps.value_of(SASL_CAP),
        Some(Some("PLAIN".to_string()))
    );
}

#[tokio::test]
async fn authenticate_without_parameter_gets_461() {
    let mut net = TestNet::new();
    let mut client = net.connect_client("walt", "w").await;

    net.client_line(&client, "AUTHENTICATE").await;
    assert_eq!(
        client.expect_line(),
        ":irc.example.net 461 walt AUTHENTICATE :Not enough parameters"
    );
}

#[tokio::test]
async fn malformed_services_sasl_is_dropped() {
    let mut net = TestNet::new();

    // Below min_args: silently dropped, nothing emitted anywhere.
    net.services_line("SASL onlyagent").await;
    net.assert_no_server_traffic();
}
