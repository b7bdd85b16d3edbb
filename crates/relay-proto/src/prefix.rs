//! IRC message prefix types.
//!
//! A prefix identifies the origin of a message: either a server (by name
//! or TS6 SID) or a user's `nick!user@host` mask.

use std::fmt;

/// An owned message prefix.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Prefix {
    /// Server origin: a server name (`irc.example.net`) or SID (`00A`).
    ServerName(String),
    /// User origin: (nickname, username, hostname).
    Nickname(String, String, String),
}

impl Prefix {
    /// Parse a prefix string leniently.
    ///
    /// A bare token containing a dot, or a three-character TS6 SID
    /// starting with a digit, is treated as a server origin; anything
    /// else becomes a user prefix with possibly empty user/host parts.
    pub fn new_from_str(s: &str) -> Self {
        if let Some((name, rest)) = s.split_once('!') {
            let (user, host) = rest.split_once('@').unwrap_or((rest, ""));
            return Prefix::Nickname(name.to_string(), user.to_string(), host.to_string());
        }
        if let Some((name, host)) = s.split_once('@') {
            return Prefix::Nickname(name.to_string(), String::new(), host.to_string());
        }
        if s.contains('.') || is_sid(s) {
            Prefix::ServerName(s.to_string())
        } else {
            Prefix::Nickname(s.to_string(), String::new(), String::new())
        }
    }

    /// The leading name component (server name, SID, or nickname).
    pub fn name(&self) -> &str {
        match self {
            Prefix::ServerName(name) => name,
            Prefix::Nickname(nick, _, _) => nick,
        }
    }

    /// Whether this prefix names a server rather than a user.
    pub fn is_server(&self) -> bool {
        matches!(self, Prefix::ServerName(_))
    }
}

/// TS6 SID: three characters, first a digit, rest alphanumeric.
fn is_sid(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 3
        && bytes[0].is_ascii_digit()
        && bytes[1..].iter().all(|b| b.is_ascii_alphanumeric())
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => write!(f, "{}", name),
            Prefix::Nickname(nick, user, host) => {
                write!(f, "{}", nick)?;
                if !user.is_empty() {
                    write!(f, "!{}", user)?;
                }
                if !host.is_empty() {
                    write!(f, "@{}", host)?;
                }
                Ok(())
            }
        }
    }
}

/// A borrowed prefix, referencing the transport buffer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PrefixRef<'a> {
    raw: &'a str,
}

impl<'a> PrefixRef<'a> {
    pub(crate) fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    /// The raw prefix text, without the leading `:`.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// The leading name component (server name, SID, or nickname).
    pub fn name(&self) -> &'a str {
        self.raw
            .split_once(['!', '@'])
            .map(|(name, _)| name)
            .unwrap_or(self.raw)
    }

    /// Convert to an owned [`Prefix`].
    pub fn to_owned(&self) -> Prefix {
        Prefix::new_from_str(self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_server_name() {
        let prefix = Prefix::new_from_str("irc.example.net");
        assert_eq!(prefix, Prefix::ServerName("irc.example.net".to_string()));
        assert!(prefix.is_server());
    }

    #[test]
    fn parses_sid_as_server() {
        assert!(Prefix::new_from_str("00A").is_server());
        assert!(Prefix::new_from_str("9SS").is_server());
        // Nick-shaped tokens are not SIDs
        assert!(!Prefix::new_from_str("alice").is_server());
    }

    #[test]
    fn parses_full_user_mask() {
        let prefix = Prefix::new_from_str("alice!ident@host.example");
        assert_eq!(
            prefix,
            Prefix::Nickname(
                "alice".to_string(),
                "ident".to_string(),
                "host.example".to_string()
            )
        );
        assert_eq!(prefix.to_string(), "alice!ident@host.example");
    }

    #[test]
    fn prefix_ref_name() {
        assert_eq!(PrefixRef::new("alice!ident@host").name(), "alice");
        assert_eq!(PrefixRef::new("services.example").name(), "services.example");
    }
}
