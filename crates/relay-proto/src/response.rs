//! Reply numerics and their semantic constructors.
//!
//! Only the numerics the relay emits are defined here; the host daemon
//! owns the rest of the reply space.

use crate::command::Command;
use crate::message::Message;

/// Numeric replies sent by the relay.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[allow(non_camel_case_types)]
#[repr(u16)]
pub enum Response {
    /// `461 ERR_NEEDMOREPARAMS`
    ERR_NEEDMOREPARAMS = 461,
    /// `462 ERR_ALREADYREGISTERED`
    ERR_ALREADYREGISTERED = 462,
    /// `900 RPL_LOGGEDIN`
    RPL_LOGGEDIN = 900,
    /// `903 RPL_SASLSUCCESS`
    RPL_SASLSUCCESS = 903,
    /// `904 ERR_SASLFAIL`
    ERR_SASLFAIL = 904,
    /// `906 ERR_SASLABORTED`
    ERR_SASLABORTED = 906,
}

impl Response {
    /// The three-digit numeric code.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Look up a numeric by code.
    pub fn from_code(code: u16) -> Option<Response> {
        match code {
            461 => Some(Response::ERR_NEEDMOREPARAMS),
            462 => Some(Response::ERR_ALREADYREGISTERED),
            900 => Some(Response::RPL_LOGGEDIN),
            903 => Some(Response::RPL_SASLSUCCESS),
            904 => Some(Response::ERR_SASLFAIL),
            906 => Some(Response::ERR_SASLABORTED),
            _ => None,
        }
    }

    /// Helper to construct a Message with a Response command.
    fn reply(response: Response, args: Vec<String>) -> Message {
        Message {
            tags: None,
            prefix: None,
            command: Command::Response(response, args),
        }
    }

    /// `900 RPL_LOGGEDIN`
    /// `<nick> <nick>!<user>@<host> <account> :You are now logged in as <account>`
    pub fn rpl_loggedin(client: &str, mask: &str, account: &str) -> Message {
        Self::reply(
            Response::RPL_LOGGEDIN,
            vec![
                client.to_string(),
                mask.to_string(),
                account.to_string(),
                format!("You are now logged in as {}", account),
            ],
        )
    }

    /// `903 RPL_SASLSUCCESS`
    /// `:SASL authentication successful`
    pub fn rpl_saslsuccess(client: &str) -> Message {
        Self::reply(
            Response::RPL_SASLSUCCESS,
            vec![
                client.to_string(),
                "SASL authentication successful".to_string(),
            ],
        )
    }

    /// `904 ERR_SASLFAIL`
    /// `:SASL authentication failed`
    pub fn err_saslfail(client: &str) -> Message {
        Self::reply(
            Response::ERR_SASLFAIL,
            vec![client.to_string(), "SASL authentication failed".to_string()],
        )
    }

    /// `904 ERR_SASLFAIL` with the message-limit wording.
    /// `:SASL message limit exceeded`
    pub fn err_sasllimit(client: &str) -> Message {
        Self::reply(
            Response::ERR_SASLFAIL,
            vec![client.to_string(), "SASL message limit exceeded".to_string()],
        )
    }

    /// `906 ERR_SASLABORTED`
    /// `:SASL authentication aborted`
    pub fn err_saslaborted(client: &str) -> Message {
        Self::reply(
            Response::ERR_SASLABORTED,
            vec![
                client.to_string(),
                "SASL authentication aborted".to_string(),
            ],
        )
    }

    /// `462 ERR_ALREADYREGISTERED`
    /// `:You may not reregister`
    pub fn err_alreadyregistered(client: &str) -> Message {
        Self::reply(
            Response::ERR_ALREADYREGISTERED,
            vec![client.to_string(), "You may not reregister".to_string()],
        )
    }

    /// `461 ERR_NEEDMOREPARAMS`
    /// `<command> :Not enough parameters`
    pub fn err_needmoreparams(client: &str, command: &str) -> Message {
        Self::reply(
            Response::ERR_NEEDMOREPARAMS,
            vec![
                client.to_string(),
                command.to_string(),
                "Not enough parameters".to_string(),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_roundtrip() {
        for resp in [
            Response::ERR_NEEDMOREPARAMS,
            Response::ERR_ALREADYREGISTERED,
            Response::RPL_LOGGEDIN,
            Response::RPL_SASLSUCCESS,
            Response::ERR_SASLFAIL,
            Response::ERR_SASLABORTED,
        ] {
            assert_eq!(Response::from_code(resp.code()), Some(resp));
        }
        assert_eq!(Response::from_code(905), None);
    }

    #[test]
    fn loggedin_body() {
        let msg = Response::rpl_loggedin("alice", "alice!a@host", "alice");
        assert_eq!(
            msg.to_string(),
            "900 alice alice!a@host alice :You are now logged in as alice"
        );
    }
}
