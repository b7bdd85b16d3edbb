//! Owned IRC message type.

use crate::borrowed::MessageRef;
use crate::command::Command;
use crate::error::MessageParseError;
use crate::prefix::Prefix;
use std::fmt;
use std::str::FromStr;

/// An IRCv3 message tag: key and optional value.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tag(pub String, pub Option<String>);

/// An owned IRC message.
///
/// # Example
///
/// ```
/// use relay_proto::{Command, Message, Prefix};
///
/// let msg = Message {
///     tags: None,
///     prefix: Some(Prefix::ServerName("00A".to_string())),
///     command: Command::AUTHENTICATE("+".to_string()),
/// };
/// assert_eq!(msg.to_string(), ":00A AUTHENTICATE +");
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Message {
    /// IRCv3 message tags, if present.
    pub tags: Option<Vec<Tag>>,
    /// Message origin.
    pub prefix: Option<Prefix>,
    /// The command and its parameters.
    pub command: Command,
}

impl Message {
    /// Attach a prefix, consuming the message.
    pub fn with_prefix(mut self, prefix: Prefix) -> Message {
        self.prefix = Some(prefix);
        self
    }

    /// The command name (numeric code for replies).
    pub fn command_name(&self) -> String {
        self.command.name()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tags) = &self.tags {
            if !tags.is_empty() {
                write!(f, "@")?;
                for (i, Tag(key, value)) in tags.iter().enumerate() {
                    if i > 0 {
                        write!(f, ";")?;
                    }
                    match value {
                        Some(v) => write!(f, "{}={}", key, v)?,
                        None => write!(f, "{}", key)?,
                    }
                }
                write!(f, " ")?;
            }
        }
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}", self.command)
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Message, MessageParseError> {
        MessageRef::parse(s).map(|msg| msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;

    #[test]
    fn display_with_server_prefix() {
        let msg = Message {
            tags: None,
            prefix: Some(Prefix::ServerName("irc.example.net".to_string())),
            command: Command::Response(
                Response::ERR_SASLFAIL,
                vec!["*".to_string(), "SASL authentication failed".to_string()],
            ),
        };
        assert_eq!(
            msg.to_string(),
            ":irc.example.net 904 * :SASL authentication failed"
        );
    }

    #[test]
    fn parse_roundtrip() {
        let line = ":00A ENCAP * SASL 00AAAAAAB * H host.example 192.0.2.7";
        let msg: Message = line.parse().unwrap();
        assert_eq!(msg.to_string(), line);
    }

    #[test]
    fn parse_trailing_preserved() {
        let msg: Message = "MECHLIST :PLAIN EXTERNAL".parse().unwrap();
        assert_eq!(
            msg.command,
            Command::Raw("MECHLIST".to_string(), vec!["PLAIN EXTERNAL".to_string()])
        );
    }
}
