//! Session errors and their retry classification

use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not connected to MCP server")]
    NotConnected,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Tool '{name}' reported an error: {message}")]
    Tool { name: String, message: String },

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Giving up after {attempts} connection attempts: {last_error}")]
    AttemptsExhausted { attempts: u32, last_error: String },
}

impl SessionError {
    /// Whether retrying the same operation may succeed
    ///
    /// Unreachable servers, timeouts and dropped transports are transient.
    /// JSON-RPC errors, tool-reported failures and local misuse are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SessionError::Connection(_) | SessionError::Timeout(_) | SessionError::Transport(_)
        )
    }

    /// Connection failure described by the innermost cause of `err`
    pub fn connection(err: &(dyn StdError + 'static)) -> Self {
        SessionError::Connection(root_cause_message(err))
    }

    pub fn invalid_header(name: impl Into<String>, reason: impl ToString) -> Self {
        SessionError::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<rmcp::ServiceError> for SessionError {
    fn from(err: rmcp::ServiceError) -> Self {
        use rmcp::ServiceError;

        match err {
            ServiceError::McpError(data) => SessionError::Protocol(data.message.to_string()),
            ServiceError::UnexpectedResponse => {
                SessionError::Protocol("unexpected response type".to_string())
            }
            ServiceError::Timeout { timeout } => SessionError::Timeout(timeout),
            other => SessionError::Transport(root_cause_message(&other)),
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Innermost error in a `source()` chain
pub fn root_cause<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current
}

/// Message of the innermost error, falling back to the outer message when empty
pub fn root_cause_message(err: &(dyn StdError + 'static)) -> String {
    let message = root_cause(err).to_string();
    if message.trim().is_empty() {
        err.to_string()
    } else {
        message
    }
}
