//! Session/connection manager for the MCP tool server
//!
//! ```text
//!   Disconnected ──connect()──▶ Connecting ──ok──▶ Connected
//!        ▲                          │                  │
//!        │                          └──exhausted──▶ Failed
//!        └──────────── disconnect() ◀──────────────────┘
//! ```
//!
//! Only `connect()` and `disconnect()` move the state machine. Failures of
//! `get_tools()`/`call_tool()` are reported to the caller and leave the state
//! untouched.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::McpSettings;
use crate::logging::Logger;
use crate::types::ToolDescriptor;

use super::error::{SessionError, SessionResult};
use super::headers::SessionHeaders;
use super::retry::RetryPolicy;
use super::transport::{McpConnector, McpSession, StreamableHttpConnector};

/// Lifecycle of the connection to the MCP server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed(String),
}

/// Reported health of the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Connected,
    Disconnected,
    Error,
}

/// Point-in-time health snapshot; produced without ever failing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionHealth {
    pub status: HealthStatus,
    pub tool_count: usize,
    pub session_id: Option<String>,
    pub attempt_count: u32,
    pub server_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Static settings of a manager
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub url: String,
    pub protocol_version: String,
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub max_connection_attempts: u32,
}

impl From<&McpSettings> for SessionOptions {
    fn from(settings: &McpSettings) -> Self {
        Self {
            url: settings.url(),
            protocol_version: settings.protocol_version.clone(),
            headers: settings.headers.clone(),
            timeout: settings.timeout(),
            retry: RetryPolicy::from(&settings.retry),
            max_connection_attempts: settings.max_connection_attempts.max(1),
        }
    }
}

impl SessionOptions {
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

struct Inner {
    state: ConnectionState,
    session: Option<Arc<dyn McpSession>>,
    session_id: Option<String>,
    headers: Option<SessionHeaders>,
    attempts: u32,
    last_error: Option<String>,
}

impl Inner {
    fn session_id(&mut self) -> String {
        self.session_id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    }
}

/// Owns the connection to the MCP server
///
/// Connection transitions are serialized by an async gate; the session
/// handle is cloned out of a short-lived lock before any network call so
/// operations never hold a lock across I/O.
pub struct SessionManager {
    options: SessionOptions,
    connector: Arc<dyn McpConnector>,
    inner: Mutex<Inner>,
    gate: tokio::sync::Mutex<()>,
    logger: Arc<dyn Logger>,
}

impl SessionManager {
    pub fn new(options: SessionOptions, connector: Arc<dyn McpConnector>, logger: Arc<dyn Logger>) -> Self {
        Self {
            options,
            connector,
            inner: Mutex::new(Inner {
                state: ConnectionState::Disconnected,
                session: None,
                session_id: None,
                headers: None,
                attempts: 0,
                last_error: None,
            }),
            gate: tokio::sync::Mutex::new(()),
            logger,
        }
    }

    /// Manager speaking Streamable HTTP to the configured server
    pub fn streamable_http(settings: &McpSettings, logger: Arc<dyn Logger>) -> Self {
        let connector = Arc::new(StreamableHttpConnector::new(Arc::clone(&logger)));
        Self::new(SessionOptions::from(settings), connector, logger)
    }

    pub fn server_url(&self) -> &str {
        &self.options.url
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.lock().state.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.lock().state == ConnectionState::Connected
    }

    pub fn session_id(&self) -> Option<String> {
        self.inner.lock().session_id.clone()
    }

    /// Headers of the current (or next) connection
    pub fn headers(&self) -> Option<SessionHeaders> {
        self.inner.lock().headers.clone()
    }

    /// Consecutive failed `connect()` calls since the last success or reset
    pub fn attempt_count(&self) -> u32 {
        self.inner.lock().attempts
    }

    /// Whether the manager has given up until `reset_connection_attempts()`
    pub fn is_exhausted(&self) -> bool {
        self.inner.lock().attempts >= self.options.max_connection_attempts
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }

    /// Connect to the server, retrying transient failures
    ///
    /// Each call counts as one manager-level attempt. Once the configured
    /// number of consecutive attempts has failed the manager is `Failed` and
    /// further calls return [`SessionError::AttemptsExhausted`] without
    /// touching the network. Success resets the counter.
    pub async fn connect(&self) -> SessionResult<()> {
        let _gate = self.gate.lock().await;

        let (session_id, headers, attempt) = {
            let mut inner = self.inner.lock();
            if inner.state == ConnectionState::Connected {
                return Ok(());
            }
            if inner.attempts >= self.options.max_connection_attempts {
                let last_error = inner
                    .last_error
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string());
                inner.state = ConnectionState::Failed(last_error.clone());
                return Err(SessionError::AttemptsExhausted {
                    attempts: inner.attempts,
                    last_error,
                });
            }

            inner.attempts += 1;
            inner.state = ConnectionState::Connecting;
            let session_id = inner.session_id();
            let headers = SessionHeaders::build(&self.options.headers, &self.options.protocol_version, &session_id);
            inner.headers = Some(headers.clone());
            (session_id, headers, inner.attempts)
        };

        self.logger.info(&format!(
            "[SessionManager] Connecting to {} (attempt {}/{}, session {})",
            self.options.url, attempt, self.options.max_connection_attempts, session_id
        ));

        let result = self
            .options
            .retry
            .run("connect", self.logger.as_ref(), |_| {
                self.connector
                    .connect(&self.options.url, &headers, self.options.timeout)
            })
            .await;

        let mut inner = self.inner.lock();
        match result {
            Ok(session) => {
                inner.session = Some(session);
                inner.state = ConnectionState::Connected;
                inner.attempts = 0;
                inner.last_error = None;
                self.logger.info("[SessionManager] Connected");
                Ok(())
            }
            Err(err) => {
                let reason = err.to_string();
                self.logger.error(&format!(
                    "[SessionManager] Connection attempt {} failed: {}",
                    attempt, reason
                ));
                inner.state = ConnectionState::Failed(reason.clone());
                inner.last_error = Some(reason);
                Err(err)
            }
        }
    }

    /// Drop the session; safe to call in any state
    pub async fn disconnect(&self) {
        let _gate = self.gate.lock().await;
        let session = {
            let mut inner = self.inner.lock();
            inner.state = ConnectionState::Disconnected;
            inner.session_id = None;
            inner.headers = None;
            inner.session.take()
        };
        if let Some(session) = session {
            session.close().await;
            self.logger.info("[SessionManager] Disconnected");
        }
    }

    /// Current tool list from the server
    pub async fn get_tools(&self) -> SessionResult<Vec<ToolDescriptor>> {
        let session = self.session()?;
        let tools = self
            .options
            .retry
            .run("tools/list", self.logger.as_ref(), |_| session.list_tools())
            .await?;
        self.logger.info(&format!(
            "[SessionManager] Discovered {} tools",
            tools.len()
        ));
        Ok(tools)
    }

    /// Invoke a tool by name
    pub async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> SessionResult<Value> {
        let session = self.session()?;
        self.logger
            .info(&format!("[SessionManager] Calling tool: {}", name));
        self.options
            .retry
            .run("tools/call", self.logger.as_ref(), |_| {
                session.call_tool(name, arguments.clone())
            })
            .await
    }

    /// Snapshot of the connection; never fails
    pub async fn health_check(&self) -> SessionHealth {
        let (state, session, session_id, attempt_count, last_error) = {
            let inner = self.inner.lock();
            (
                inner.state.clone(),
                inner.session.clone(),
                inner.session_id.clone(),
                inner.attempts,
                inner.last_error.clone(),
            )
        };

        let mut health = SessionHealth {
            status: HealthStatus::Disconnected,
            tool_count: 0,
            session_id,
            attempt_count,
            server_url: self.options.url.clone(),
            error: None,
        };

        match (state, session) {
            (ConnectionState::Connected, Some(session)) => match session.list_tools().await {
                Ok(tools) => {
                    health.status = HealthStatus::Connected;
                    health.tool_count = tools.len();
                }
                Err(err) => {
                    health.status = HealthStatus::Error;
                    health.error = Some(err.to_string());
                }
            },
            (ConnectionState::Failed(reason), _) => {
                health.status = HealthStatus::Error;
                health.error = Some(reason);
            }
            _ => {
                health.error = last_error;
            }
        }
        health
    }

    /// Regenerate the session identifier and headers
    ///
    /// The live connection is kept; the new identity applies from the next
    /// `connect()`.
    pub fn refresh_session(&self) -> String {
        let mut inner = self.inner.lock();
        let session_id = Uuid::new_v4().to_string();
        inner.session_id = Some(session_id.clone());
        inner.headers = Some(SessionHeaders::build(
            &self.options.headers,
            &self.options.protocol_version,
            &session_id,
        ));
        self.logger.info(&format!(
            "[SessionManager] Session refreshed: {}",
            session_id
        ));
        session_id
    }

    /// Allow `connect()` to try again after exhaustion
    pub fn reset_connection_attempts(&self) {
        let mut inner = self.inner.lock();
        inner.attempts = 0;
        if matches!(inner.state, ConnectionState::Failed(_)) {
            inner.state = ConnectionState::Disconnected;
        }
    }

    fn session(&self) -> SessionResult<Arc<dyn McpSession>> {
        let inner = self.inner.lock();
        match (&inner.state, &inner.session) {
            (ConnectionState::Connected, Some(session)) => Ok(Arc::clone(session)),
            _ => Err(SessionError::NotConnected),
        }
    }
}
