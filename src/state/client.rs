//! Client records owned by the host daemon.
//!
//! The relay reads and writes a small overlay of these fields (`account`,
//! `username`, `host`); everything else belongs to the host's registration
//! and messaging paths.

use relay_proto::Message;
use std::collections::HashSet;
use tokio::sync::mpsc;

/// Connection identifier for a client, unique for the process lifetime.
pub type ClientId = u64;

/// Maximum stored length of an account name.
pub const ACCOUNT_LEN: usize = 32;
/// Maximum stored length of a username (ident).
pub const USER_LEN: usize = 10;
/// Maximum stored length of a hostname.
pub const HOST_LEN: usize = 63;

/// A client known to this server.
///
/// Local clients carry a sender for their connection; clients learned from
/// the network (services pseudo-clients among them) do not.
#[derive(Debug)]
pub struct Client {
    /// Connection id, the stable in-process key.
    pub id: ClientId,
    /// Server-assigned UID; empty until allocated.
    pub uid: String,
    /// Nickname, once one has been accepted.
    pub nick: Option<String>,
    /// Username (ident).
    pub username: String,
    /// Visible hostname.
    pub host: String,
    /// Socket host (IP address text).
    pub sockhost: String,
    /// Services account name; empty when logged out.
    pub account: String,
    /// Capabilities negotiated via CAP.
    pub caps: HashSet<String>,
    /// Whether registration (NICK/USER/CAP END) has completed.
    pub registered: bool,
    /// Whether this client is flagged as a network service.
    pub is_service: bool,
    /// Outgoing message queue; `Some` for locally connected clients.
    pub sender: Option<mpsc::Sender<Message>>,
}

impl Client {
    /// Get the nick or "*" for pre-registration numerics.
    pub fn nick_or_star(&self) -> &str {
        self.nick.as_deref().unwrap_or("*")
    }

    /// Whether this client is connected to this server.
    pub fn is_local(&self) -> bool {
        self.sender.is_some()
    }

    /// Check if a capability is enabled.
    pub fn has_cap(&self, cap: &str) -> bool {
        self.caps.contains(cap)
    }

    /// Set the account name, truncated to field capacity.
    pub fn set_account(&mut self, account: &str) {
        self.account = truncate_field(account, ACCOUNT_LEN);
    }

    /// Set the username, truncated to field capacity.
    pub fn set_username(&mut self, username: &str) {
        self.username = truncate_field(username, USER_LEN);
    }

    /// Set the visible host, truncated to field capacity.
    pub fn set_host(&mut self, host: &str) {
        self.host = truncate_field(host, HOST_LEN);
    }
}

/// Truncate to at most `max` bytes without splitting a UTF-8 sequence.
fn truncate_field(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client {
            id: 1,
            uid: String::new(),
            nick: None,
            username: String::new(),
            host: "host.example".to_string(),
            sockhost: "192.0.2.7".to_string(),
            account: String::new(),
            caps: HashSet::new(),
            registered: false,
            is_service: false,
            sender: None,
        }
    }

    #[test]
    fn nick_or_star_defaults() {
        let mut c = client();
        assert_eq!(c.nick_or_star(), "*");
        c.nick = Some("alice".to_string());
        assert_eq!(c.nick_or_star(), "alice");
    }

    #[test]
    fn account_is_truncated() {
        let mut c = client();
        c.set_account(&"a".repeat(100));
        assert_eq!(c.account.len(), ACCOUNT_LEN);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 'é' is two bytes; cutting mid-sequence must back off.
        let s = "é".repeat(6);
        let out = truncate_field(&s, 9);
        assert_eq!(out, "é".repeat(4));
    }
}
