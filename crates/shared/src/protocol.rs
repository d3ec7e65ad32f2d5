use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Exact body the backend returns in place of a payload when an operation fails.
pub const ERROR_SENTINEL: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// How a response body is interpreted once it arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyPolicy {
    /// The body is compared against [`ERROR_SENTINEL`] before it is used.
    Checked,
    /// The body is passed through untouched, even when it equals the sentinel.
    Unchecked,
    /// Nobody looks at the body.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    AssembleRom,
    AssembleFlash,
    RunCycle,
    Run,
    Reset,
    Flush,
    Ram,
    Rom,
    Flash,
    Registers,
    Error,
    ClearError,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::AssembleRom => "/assemble_rom_code",
            Endpoint::AssembleFlash => "/assemble_flash_code",
            Endpoint::RunCycle => "/run_cycle",
            Endpoint::Run => "/run",
            Endpoint::Reset => "/reset",
            Endpoint::Flush => "/flush",
            Endpoint::Ram => "/ram",
            Endpoint::Rom => "/rom",
            Endpoint::Flash => "/flash",
            Endpoint::Registers => "/registers",
            Endpoint::Error => "/error",
            Endpoint::ClearError => "/clearerr",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Endpoint::AssembleRom | Endpoint::AssembleFlash => Method::Post,
            _ => Method::Get,
        }
    }

    pub fn reply_policy(self) -> ReplyPolicy {
        match self {
            Endpoint::AssembleRom
            | Endpoint::AssembleFlash
            | Endpoint::RunCycle
            | Endpoint::Run
            | Endpoint::Rom
            | Endpoint::Flash => ReplyPolicy::Checked,
            Endpoint::Ram | Endpoint::Registers | Endpoint::Error => ReplyPolicy::Unchecked,
            Endpoint::Reset | Endpoint::Flush | Endpoint::ClearError => ReplyPolicy::Ignored,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Form body of the two assemble endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembleForm {
    pub code: String,
}

pub type Reply = Result<String, BackendError>;

/// Turns a raw response body into a tagged reply.
///
/// The sentinel is matched by exact equality and only for [`ReplyPolicy::Checked`]
/// endpoints, so `"no error here"` is a payload and an unchecked `"error"` body
/// (RAM, registers) still reaches its pane.
pub fn decode_reply(endpoint: Endpoint, body: String) -> Reply {
    match endpoint.reply_policy() {
        ReplyPolicy::Checked if body == ERROR_SENTINEL => {
            Err(BackendError::Application { endpoint })
        }
        _ => Ok(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn sentinel_on_checked_endpoint_is_an_application_error() {
        let err = decode_reply(Endpoint::AssembleRom, "error".to_string()).expect_err("sentinel");
        assert_eq!(err.kind(), ErrorKind::Application);
        assert_eq!(err.endpoint(), Endpoint::AssembleRom);
    }

    #[test]
    fn sentinel_match_is_exact() {
        for body in ["no error here", "error ", "Error", "errors", ""] {
            assert_eq!(
                decode_reply(Endpoint::Run, body.to_string()),
                Ok(body.to_string())
            );
        }
    }

    #[test]
    fn unchecked_endpoints_pass_sentinel_through() {
        assert_eq!(
            decode_reply(Endpoint::Ram, "error".to_string()),
            Ok("error".to_string())
        );
        assert_eq!(
            decode_reply(Endpoint::Reset, "error".to_string()),
            Ok("error".to_string())
        );
    }

    #[test]
    fn only_assemble_endpoints_post() {
        assert_eq!(Endpoint::AssembleFlash.method(), Method::Post);
        assert_eq!(Endpoint::ClearError.method(), Method::Get);
        assert_eq!(Endpoint::ClearError.to_string(), "/clearerr");
    }
}
