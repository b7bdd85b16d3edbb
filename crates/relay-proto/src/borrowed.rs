//! Zero-copy borrowed message parsing.
//!
//! [`MessageRef`] borrows from the transport buffer, so inbound dispatch
//! does not allocate. Convert with [`MessageRef::to_owned`] when a message
//! must outlive the buffer.

use crate::command::Command;
use crate::error::MessageParseError;
use crate::message::{Message, Tag};
use crate::prefix::PrefixRef;

/// A borrowed IRC message referencing the original input.
#[derive(Clone, PartialEq, Debug)]
pub struct MessageRef<'a> {
    /// Raw tags string (without the leading `@`), if present.
    pub tags: Option<&'a str>,
    /// Message origin, if present.
    pub prefix: Option<PrefixRef<'a>>,
    /// Command name, as received.
    pub command: &'a str,
    /// Command arguments; a trailing parameter keeps its spaces.
    pub args: Vec<&'a str>,
}

impl<'a> MessageRef<'a> {
    /// Parse a single IRC line.
    ///
    /// Trailing CR/LF is tolerated. Tags and prefix are optional; the
    /// trailing parameter (after ` :`) is taken verbatim.
    pub fn parse(s: &'a str) -> Result<MessageRef<'a>, MessageParseError> {
        let mut rest = s.trim_end_matches(['\r', '\n']);
        if rest.is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let tags = if let Some(after) = rest.strip_prefix('@') {
            let (tags, tail) = after
                .split_once(' ')
                .ok_or(MessageParseError::MissingCommand)?;
            rest = tail.trim_start_matches(' ');
            Some(tags)
        } else {
            None
        };

        let prefix = if let Some(after) = rest.strip_prefix(':') {
            let (prefix, tail) = after
                .split_once(' ')
                .ok_or(MessageParseError::MissingCommand)?;
            rest = tail.trim_start_matches(' ');
            Some(PrefixRef::new(prefix))
        } else {
            None
        };

        let (command, mut rest) = match rest.split_once(' ') {
            Some((command, tail)) => (command, tail),
            None => (rest, ""),
        };
        if command.is_empty() {
            return Err(MessageParseError::MissingCommand);
        }

        let mut args = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                args.push(trailing);
                break;
            }
            match rest.split_once(' ') {
                Some((arg, tail)) => {
                    args.push(arg);
                    rest = tail;
                }
                None => {
                    args.push(rest);
                    break;
                }
            }
        }

        Ok(MessageRef {
            tags,
            prefix,
            command,
            args,
        })
    }

    /// The command name, uppercased for dispatch.
    pub fn command_name(&self) -> String {
        self.command.to_ascii_uppercase()
    }

    /// Get an argument by index.
    #[inline]
    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).copied()
    }

    /// Number of arguments.
    #[inline]
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Convert to an owned [`Message`].
    pub fn to_owned(&self) -> Message {
        let tags = self.tags.map(|raw| {
            raw.split(';')
                .filter(|t| !t.is_empty())
                .map(|t| match t.split_once('=') {
                    Some((k, v)) => Tag(k.to_string(), Some(v.to_string())),
                    None => Tag(t.to_string(), None),
                })
                .collect()
        });
        Message {
            tags,
            prefix: self.prefix.map(|p| p.to_owned()),
            // Arguments were already tokenized, so construction cannot fail.
            command: Command::new(self.command, self.args.clone())
                .unwrap_or_else(|_| Command::Raw(self.command.to_string(), Vec::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_command() {
        let msg = MessageRef::parse("AUTHENTICATE *\r\n").unwrap();
        assert_eq!(msg.command_name(), "AUTHENTICATE");
        assert_eq!(msg.arg(0), Some("*"));
        assert_eq!(msg.arg_count(), 1);
    }

    #[test]
    fn parses_prefix_and_trailing() {
        let msg = MessageRef::parse(":9SS SVSLOGIN 00AAAAAAB * * * :alice").unwrap();
        assert_eq!(msg.prefix.unwrap().raw(), "9SS");
        assert_eq!(msg.args, vec!["00AAAAAAB", "*", "*", "*", "alice"]);
    }

    #[test]
    fn trailing_keeps_spaces() {
        let msg = MessageRef::parse("MECHLIST :PLAIN EXTERNAL SCRAM-SHA-256").unwrap();
        assert_eq!(msg.arg(0), Some("PLAIN EXTERNAL SCRAM-SHA-256"));
    }

    #[test]
    fn base64_payload_is_verbatim() {
        let msg = MessageRef::parse("AUTHENTICATE dXNlcgB1c2VyAHB3").unwrap();
        assert_eq!(msg.arg(0), Some("dXNlcgB1c2VyAHB3"));
    }

    #[test]
    fn empty_line_is_error() {
        assert_eq!(
            MessageRef::parse("\r\n"),
            Err(MessageParseError::EmptyMessage)
        );
    }

    #[test]
    fn tags_are_parsed() {
        let msg = MessageRef::parse("@time=2026-01-01T00:00:00Z PING :x").unwrap();
        assert_eq!(msg.tags, Some("time=2026-01-01T00:00:00Z"));
        let owned = msg.to_owned();
        assert_eq!(owned.tags.as_ref().map(|t| t.len()), Some(1));
    }
}
