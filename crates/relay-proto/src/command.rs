//! The command portion of an IRC message.

use crate::error::MessageParseError;
use crate::response::Response;
use std::fmt;

/// An IRC command with its parameters.
///
/// Commands the relay constructs or inspects get typed variants; anything
/// else round-trips through [`Command::Raw`]. Services-originated relay
/// commands (`SASL`, `SVSLOGIN`, `MECHLIST`) arrive with the encapsulation
/// envelope already stripped by the host dispatcher, so they appear here
/// as raw commands.
#[derive(Clone, PartialEq, Debug)]
pub enum Command {
    /// `AUTHENTICATE <data>`: client SASL exchange, both directions.
    AUTHENTICATE(String),
    /// `ENCAP <target-mask> <subcommand> [args...]`: server-to-server
    /// envelope for non-core commands.
    ENCAP(String, String, Vec<String>),
    /// A numeric reply with its arguments.
    Response(Response, Vec<String>),
    /// Any other command, verbatim.
    Raw(String, Vec<String>),
}

impl Command {
    /// Build a command from a name and argument list.
    pub fn new(name: &str, args: Vec<&str>) -> Result<Command, MessageParseError> {
        if name.is_empty() {
            return Err(MessageParseError::MissingCommand);
        }
        if name.len() == 3 && name.bytes().all(|b| b.is_ascii_digit()) {
            let code: u16 = name
                .parse()
                .map_err(|_| MessageParseError::InvalidCommand(name.to_string()))?;
            let args = args.into_iter().map(str::to_string).collect();
            return Ok(match Response::from_code(code) {
                Some(resp) => Command::Response(resp, args),
                None => Command::Raw(name.to_string(), args),
            });
        }

        match name.to_ascii_uppercase().as_str() {
            "AUTHENTICATE" if args.len() == 1 => Ok(Command::AUTHENTICATE(args[0].to_string())),
            "ENCAP" if args.len() >= 2 => Ok(Command::ENCAP(
                args[0].to_string(),
                args[1].to_string(),
                args[2..].iter().map(|s| s.to_string()).collect(),
            )),
            _ => Ok(Command::Raw(
                name.to_ascii_uppercase(),
                args.into_iter().map(str::to_string).collect(),
            )),
        }
    }

    /// The command name (numeric code for replies).
    pub fn name(&self) -> String {
        match self {
            Command::AUTHENTICATE(_) => "AUTHENTICATE".to_string(),
            Command::ENCAP(..) => "ENCAP".to_string(),
            Command::Response(resp, _) => format!("{:03}", resp.code()),
            Command::Raw(name, _) => name.clone(),
        }
    }
}

/// Append `args` to `out`, prefixing the last one with `:` when needed.
fn write_args(out: &mut fmt::Formatter<'_>, args: &[String]) -> fmt::Result {
    let last = args.len().saturating_sub(1);
    for (i, arg) in args.iter().enumerate() {
        if i == last && needs_trailing(arg) {
            write!(out, " :{}", arg)?;
        } else {
            write!(out, " {}", arg)?;
        }
    }
    Ok(())
}

/// The last parameter needs the trailing sigil when it is empty, contains
/// a space, or itself starts with `:`.
fn needs_trailing(arg: &str) -> bool {
    arg.is_empty() || arg.contains(' ') || arg.starts_with(':')
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::AUTHENTICATE(data) => {
                write!(f, "AUTHENTICATE")?;
                if needs_trailing(data) {
                    write!(f, " :{}", data)
                } else {
                    write!(f, " {}", data)
                }
            }
            Command::ENCAP(target, sub, args) => {
                write!(f, "ENCAP {} {}", target, sub)?;
                write_args(f, args)
            }
            Command::Response(resp, args) => {
                write!(f, "{:03}", resp.code())?;
                write_args(f, args)
            }
            Command::Raw(name, args) => {
                write!(f, "{}", name)?;
                write_args(f, args)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticate_display() {
        let cmd = Command::AUTHENTICATE("+".to_string());
        assert_eq!(cmd.to_string(), "AUTHENTICATE +");
        // Empty payload still serializes as a parameter
        let cmd = Command::AUTHENTICATE(String::new());
        assert_eq!(cmd.to_string(), "AUTHENTICATE :");
    }

    #[test]
    fn encap_display() {
        let cmd = Command::ENCAP(
            "*".to_string(),
            "SASL".to_string(),
            vec!["00AAAAAAB".into(), "*".into(), "S".into(), "PLAIN".into()],
        );
        assert_eq!(cmd.to_string(), "ENCAP * SASL 00AAAAAAB * S PLAIN");
    }

    #[test]
    fn numeric_parses_to_response() {
        let cmd = Command::new("903", vec!["alice", "SASL authentication successful"]).unwrap();
        assert!(matches!(cmd, Command::Response(Response::RPL_SASLSUCCESS, _)));
        assert_eq!(
            cmd.to_string(),
            "903 alice :SASL authentication successful"
        );
    }

    #[test]
    fn unknown_command_roundtrips_raw() {
        let cmd = Command::new("MECHLIST", vec!["PLAIN EXTERNAL"]).unwrap();
        assert_eq!(
            cmd,
            Command::Raw("MECHLIST".to_string(), vec!["PLAIN EXTERNAL".to_string()])
        );
        assert_eq!(cmd.to_string(), "MECHLIST :PLAIN EXTERNAL");
    }

    #[test]
    fn command_name_is_uppercased() {
        let cmd = Command::new("svslogin", vec!["00AAAAAAB", "*"]).unwrap();
        assert_eq!(cmd.name(), "SVSLOGIN");
    }
}
