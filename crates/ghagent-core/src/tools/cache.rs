//! Tool list cache and tool execution
//!
//! The cache is an explicit object owned next to the session manager and
//! shared by `Arc`; nothing here is process-global. Entries expire after an
//! optional TTL and can be invalidated at any time. A failed refresh clears
//! the cache so the next request attempts discovery again.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde_json::{json, Value};

use crate::logging::Logger;
use crate::session::{SessionManager, SessionResult};
use crate::types::{Message, ToolDescriptor, ToolInvocation};

use super::filter::ToolFilter;

struct CachedTools {
    tools: Vec<ToolDescriptor>,
    fetched_at: Instant,
}

/// Cached tool discovery on top of a [`SessionManager`]
pub struct ToolCache {
    manager: Arc<SessionManager>,
    filter: ToolFilter,
    ttl: Option<Duration>,
    cached: RwLock<Option<CachedTools>>,
    logger: Arc<dyn Logger>,
}

impl ToolCache {
    pub fn new(manager: Arc<SessionManager>, logger: Arc<dyn Logger>) -> Self {
        Self {
            manager,
            filter: ToolFilter::new(),
            ttl: None,
            cached: RwLock::new(None),
            logger,
        }
    }

    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_filter(mut self, filter: ToolFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn manager(&self) -> &Arc<SessionManager> {
        &self.manager
    }

    /// Cached tools, if present and not expired
    pub fn cached(&self) -> Option<Vec<ToolDescriptor>> {
        let cached = self.cached.read();
        let entry = cached.as_ref()?;
        match self.ttl {
            Some(ttl) if entry.fetched_at.elapsed() >= ttl => None,
            _ => Some(entry.tools.clone()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cached().is_some()
    }

    /// Number of cached tools (0 when empty or expired)
    pub fn tool_count(&self) -> usize {
        self.cached().map(|t| t.len()).unwrap_or(0)
    }

    pub fn invalidate(&self) {
        *self.cached.write() = None;
    }

    /// Cached tools, refreshing when empty or stale
    pub async fn tools(&self) -> SessionResult<Vec<ToolDescriptor>> {
        match self.cached() {
            Some(tools) => Ok(tools),
            None => self.refresh().await,
        }
    }

    /// Connect if needed and fetch the tool list from the server
    pub async fn refresh(&self) -> SessionResult<Vec<ToolDescriptor>> {
        let result = match self.manager.connect().await {
            Ok(()) => self.manager.get_tools().await,
            Err(err) => Err(err),
        };

        match result {
            Ok(tools) => {
                let tools = self.filter.apply(tools);
                self.logger.info(&format!(
                    "[ToolCache] Cached {} tools",
                    tools.len()
                ));
                *self.cached.write() = Some(CachedTools {
                    tools: tools.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(tools)
            }
            Err(err) => {
                self.logger
                    .error(&format!("[ToolCache] Failed to fetch tools: {}", err));
                self.invalidate();
                Err(err)
            }
        }
    }

    /// Execute one tool invocation and wrap the outcome as a tool result
    ///
    /// Failures are returned to the model as an `{"error": ...}` payload
    /// instead of aborting the turn.
    pub async fn execute_tool_call(&self, call: &ToolInvocation) -> Message {
        let content = match self.manager.call_tool(&call.name, call.arguments.clone()).await {
            Ok(payload) => payload,
            Err(err) => {
                self.logger.warn(&format!(
                    "[ToolCache] Tool {} failed: {}",
                    call.name, err
                ));
                json!({ "error": err.to_string() })
            }
        };
        Message::tool_result(call.id.clone(), content).with_tool_name(call.name.clone())
    }

    /// Execute tool calls in request order
    pub async fn execute_tool_calls(&self, calls: &[ToolInvocation]) -> Vec<Message> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.execute_tool_call(call).await);
        }
        results
    }
}

/// Error payload shape used for failed tool calls
pub fn is_error_payload(value: &Value) -> bool {
    value
        .as_object()
        .map(|o| o.len() == 1 && o.contains_key("error"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::session::mock::{ScriptedConnector, ScriptedSession};
    use crate::session::{RetryPolicy, SessionError, SessionOptions};
    use serde_json::Map;
    use std::collections::BTreeMap;

    fn manager(connector: ScriptedConnector) -> Arc<SessionManager> {
        let options = SessionOptions {
            url: "http://127.0.0.1:3000/mcp/".to_string(),
            protocol_version: "2025-03-26".to_string(),
            headers: BTreeMap::new(),
            timeout: Duration::from_secs(1),
            retry: RetryPolicy::none(),
            max_connection_attempts: 3,
        };
        Arc::new(SessionManager::new(options, Arc::new(connector), Arc::new(NoOpLogger)))
    }

    #[tokio::test]
    async fn test_tools_loads_once() {
        let session = Arc::new(ScriptedSession::with_tools(&["getRepo", "listPullRequests"]));
        let cache = ToolCache::new(
            manager(ScriptedConnector::always(session.clone())),
            Arc::new(NoOpLogger),
        );

        assert!(!cache.is_loaded());
        assert_eq!(cache.tools().await.unwrap().len(), 2);
        assert_eq!(cache.tools().await.unwrap().len(), 2);
        assert_eq!(session.list_calls(), 1);
        assert_eq!(cache.tool_count(), 2);

        cache.invalidate();
        assert!(!cache.is_loaded());
        cache.tools().await.unwrap();
        assert_eq!(session.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let session = Arc::new(ScriptedSession::with_tools(&["getRepo"]));
        let cache = ToolCache::new(
            manager(ScriptedConnector::always(session.clone())),
            Arc::new(NoOpLogger),
        )
        .with_ttl(Some(Duration::ZERO));

        cache.tools().await.unwrap();
        assert!(cache.cached().is_none());
        cache.tools().await.unwrap();
        assert_eq!(session.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_invalidates() {
        let session = Arc::new(
            ScriptedSession::with_tools(&["getRepo"])
                .fail_list_times(1, || SessionError::Transport("reset".into())),
        );
        let cache = ToolCache::new(
            manager(ScriptedConnector::always(session.clone())),
            Arc::new(NoOpLogger),
        );

        assert!(cache.refresh().await.is_err());
        assert!(!cache.is_loaded());
        assert_eq!(cache.tools().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_applies_filter() {
        let session = Arc::new(ScriptedSession::with_tools(&["getRepo", "gitPush"]));
        let cache = ToolCache::new(
            manager(ScriptedConnector::always(session)),
            Arc::new(NoOpLogger),
        )
        .with_filter(ToolFilter::new().with_exclude(["gitPush".to_string()]));

        let names: Vec<String> = cache.tools().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["getRepo".to_string()]);
    }

    #[tokio::test]
    async fn test_execute_tool_calls_in_order() {
        let session = Arc::new(
            ScriptedSession::with_tools(&["getRepo", "getFile"])
                .respond("getRepo", json!({"success": true}))
                .respond_error("getFile", "File not found"),
        );
        let cache = ToolCache::new(
            manager(ScriptedConnector::always(session)),
            Arc::new(NoOpLogger),
        );
        cache.tools().await.unwrap();

        let calls = vec![
            ToolInvocation::new("c1", "getRepo", Map::new()),
            ToolInvocation::new("c2", "getFile", Map::new()),
        ];
        let results = cache.execute_tool_calls(&calls).await;
        assert_eq!(
            results[0],
            Message::tool_result("c1", json!({"success": true})).with_tool_name("getRepo")
        );
        match &results[1] {
            Message::ToolResult { tool_call_id, content, .. } => {
                assert_eq!(tool_call_id, "c2");
                assert!(is_error_payload(content));
                assert!(content["error"].as_str().unwrap().contains("File not found"));
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_without_connection_yields_error_result() {
        let cache = ToolCache::new(
            manager(ScriptedConnector::new(vec![])),
            Arc::new(NoOpLogger),
        );
        let result = cache
            .execute_tool_call(&ToolInvocation::new("c1", "getRepo", Map::new()))
            .await;
        match result {
            Message::ToolResult { content, .. } => {
                assert_eq!(content, json!({"error": "Not connected to MCP server"}))
            }
            other => panic!("unexpected message {:?}", other),
        }
    }
}
