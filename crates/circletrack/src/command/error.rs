/// Errors from talking to the remote command service.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid reply body: {0}")]
    Decode(String),

    #[error("unknown command {0:?} (expected \"start\" or \"stop\")")]
    UnknownCommand(String),
}
