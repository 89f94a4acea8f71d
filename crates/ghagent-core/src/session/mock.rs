//! Scripted connector and session for tests
//!
//! Deterministic stand-ins for the network: a connector that hands out
//! pre-built sessions (or errors) in order, and a session with a fixed tool
//! list, canned tool responses and injectable failures.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use crate::types::ToolDescriptor;

use super::error::{SessionError, SessionResult};
use super::headers::SessionHeaders;
use super::transport::{McpConnector, McpSession};

type ErrorFactory = Box<dyn Fn(u32) -> SessionError + Send + Sync>;

/// Connector returning scripted outcomes in order
pub struct ScriptedConnector {
    outcomes: Mutex<VecDeque<SessionResult<Arc<ScriptedSession>>>>,
    fallback: Option<ErrorFactory>,
    calls: AtomicU32,
    last_headers: Mutex<Option<SessionHeaders>>,
}

impl ScriptedConnector {
    /// Outcomes are consumed one per `connect`; an exhausted script fails
    /// with a connection error
    pub fn new(outcomes: Vec<SessionResult<Arc<ScriptedSession>>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            fallback: None,
            calls: AtomicU32::new(0),
            last_headers: Mutex::new(None),
        }
    }

    /// Every call fails with `make(n)`, `n` being the 1-based call number
    pub fn failing(make: impl Fn(u32) -> SessionError + Send + Sync + 'static) -> Self {
        Self {
            fallback: Some(Box::new(make)),
            ..Self::new(Vec::new())
        }
    }

    /// Connector that always yields `session`
    pub fn always(session: Arc<ScriptedSession>) -> Self {
        let outcomes = (0..64).map(|_| Ok(Arc::clone(&session))).collect();
        Self::new(outcomes)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_headers(&self) -> Option<SessionHeaders> {
        self.last_headers.lock().clone()
    }
}

#[async_trait]
impl McpConnector for ScriptedConnector {
    async fn connect(
        &self,
        _url: &str,
        headers: &SessionHeaders,
        _timeout: Duration,
    ) -> SessionResult<Arc<dyn McpSession>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_headers.lock() = Some(headers.clone());

        let next = self.outcomes.lock().pop_front();
        match next {
            Some(Ok(session)) => Ok(session as Arc<dyn McpSession>),
            Some(Err(err)) => Err(err),
            None => match &self.fallback {
                Some(make) => Err(make(call)),
                None => Err(SessionError::Connection("no scripted connection left".to_string())),
            },
        }
    }
}

enum CannedResponse {
    Value(Value),
    ToolError(String),
}

/// Session with a fixed tool list and canned responses
///
/// Tools without a canned response echo their name and arguments.
pub struct ScriptedSession {
    tools: Vec<ToolDescriptor>,
    responses: HashMap<String, CannedResponse>,
    list_failures: Mutex<Option<(u32, Box<dyn Fn() -> SessionError + Send + Sync>)>>,
    list_calls: AtomicU32,
    close_calls: AtomicU32,
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl ScriptedSession {
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self {
            tools,
            responses: HashMap::new(),
            list_failures: Mutex::new(None),
            list_calls: AtomicU32::new(0),
            close_calls: AtomicU32::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_tools(names: &[&str]) -> Self {
        Self::new(
            names
                .iter()
                .map(|name| ToolDescriptor::new(*name, format!("{} tool", name)))
                .collect(),
        )
    }

    /// Fail the next `times` `list_tools` calls with `make()`
    pub fn fail_list_times(self, times: u32, make: impl Fn() -> SessionError + Send + Sync + 'static) -> Self {
        *self.list_failures.lock() = Some((times, Box::new(make)));
        self
    }

    /// Canned successful payload for `name`
    pub fn respond(mut self, name: &str, payload: Value) -> Self {
        self.responses
            .insert(name.to_string(), CannedResponse::Value(payload));
        self
    }

    /// Make `name` report a tool error
    pub fn respond_error(mut self, name: &str, message: &str) -> Self {
        self.responses
            .insert(name.to_string(), CannedResponse::ToolError(message.to_string()));
        self
    }

    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> u32 {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Arguments of every call made to `name`, in order
    pub fn calls_for(&self, name: &str) -> Vec<Map<String, Value>> {
        self.calls
            .lock()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, args)| args.clone())
            .collect()
    }
}

#[async_trait]
impl McpSession for ScriptedSession {
    async fn list_tools(&self) -> SessionResult<Vec<ToolDescriptor>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut failures = self.list_failures.lock();
        if let Some((remaining, make)) = failures.as_mut() {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(make());
            }
        }
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> SessionResult<Value> {
        self.calls.lock().push((name.to_string(), arguments.clone()));
        match self.responses.get(name) {
            Some(CannedResponse::Value(value)) => Ok(value.clone()),
            Some(CannedResponse::ToolError(message)) => Err(SessionError::Tool {
                name: name.to_string(),
                message: message.clone(),
            }),
            None => Ok(json!({ "tool": name, "arguments": arguments })),
        }
    }

    fn server_name(&self) -> Option<String> {
        Some("scripted".to_string())
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}
