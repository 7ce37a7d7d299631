use std::time::Duration;

use serde_json::{json, Value};

use super::{echoed_action, Command, CommandError, CommandSource};

impl From<ureq::Error> for CommandError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => CommandError::Status(code),
            ureq::Error::Transport(t) => match t.kind() {
                ureq::ErrorKind::Dns | ureq::ErrorKind::ConnectionFailed => {
                    CommandError::Connection(t.to_string())
                }
                _ if is_timeout(&t) => CommandError::Timeout,
                _ => CommandError::Transport(t.to_string()),
            },
        }
    }
}

fn is_timeout(t: &ureq::Transport) -> bool {
    std::error::Error::source(t)
        .and_then(|s| s.downcast_ref::<std::io::Error>())
        .is_some_and(|e| {
            matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            )
        })
}

fn agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(timeout).build()
}

/// Command source backed by `GET <url>` returning a JSON object.
pub struct HttpCommandSource {
    agent: ureq::Agent,
    url: String,
}

impl HttpCommandSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: agent(timeout),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl CommandSource for HttpCommandSource {
    fn fetch(&mut self) -> Result<Value, CommandError> {
        let resp = self.agent.get(&self.url).call()?;
        resp.into_json::<Value>()
            .map_err(|e| CommandError::Decode(e.to_string()))
    }
}

/// Control-panel side: posts a command and reads back the echoed state.
pub struct CommandClient {
    agent: ureq::Agent,
    url: String,
}

impl CommandClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: agent(timeout),
            url: url.into(),
        }
    }

    /// Send `{"action": <command>}` and return the echoed action
    /// (`"error"` when the reply does not carry one).
    pub fn send(&self, command: Command) -> Result<String, CommandError> {
        let resp = self
            .agent
            .post(&self.url)
            .send_json(json!({ "action": command.as_str() }))?;
        let body: Value = resp
            .into_json()
            .map_err(|e| CommandError::Decode(e.to_string()))?;
        Ok(echoed_action(&body))
    }
}
