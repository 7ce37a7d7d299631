//! Remote arming.
//!
//! A background [`CommandPoller`] fetches the current command from a
//! [`CommandSource`] and publishes it into an [`EnabledFlag`] that the frame
//! loop reads once per frame.

mod error;
mod flag;
#[cfg(feature = "http")]
mod http;
mod poller;

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

pub use error::CommandError;
pub use flag::EnabledFlag;
#[cfg(feature = "http")]
pub use http::{CommandClient, HttpCommandSource};
pub use poller::{poll_once, CommandPoller, PollOutcome, PollerConfig, PollerHandle};

/// Name of the reply field carrying the command.
pub const ACTION_FIELD: &str = "action";

/// Commands understood by the tracker.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Command {
    Start,
    Stop,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
        }
    }

    /// Whether this command arms detection.
    pub fn is_armed(self) -> bool {
        self == Command::Start
    }

    /// Interpret a command-source reply.
    ///
    /// Only `{"action": "start"}` arms; a missing field, a non-string value,
    /// any other string, or a reply that is not an object all disarm.
    pub fn from_reply(reply: &Value) -> Self {
        match reply.get(ACTION_FIELD).and_then(Value::as_str) {
            Some("start") => Command::Start,
            _ => Command::Stop,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }
}

/// Extract the echoed state from a command-sink reply
/// (`{"command": {"action": ...}}`), or `"error"` when absent.
pub fn echoed_action(reply: &Value) -> String {
    reply
        .get("command")
        .and_then(|c| c.get(ACTION_FIELD))
        .and_then(Value::as_str)
        .unwrap_or("error")
        .to_string()
}

/// Anything that can report the current remote command.
///
/// Implementations perform one blocking request per call and should bound it
/// with a timeout.
pub trait CommandSource: Send {
    fn fetch(&mut self) -> Result<Value, CommandError>;
}

impl<F> CommandSource for F
where
    F: FnMut() -> Result<Value, CommandError> + Send,
{
    fn fetch(&mut self) -> Result<Value, CommandError> {
        self()
    }
}
