//! Model/tool orchestration loop

use std::sync::Arc;

use serde::Serialize;

use crate::config::LlmSettings;
use crate::conversation::{self, ConversationOutcome};
use crate::logging::Logger;
use crate::providers::{CompletionOptions, Provider, ProviderModelConfig};
use crate::tools::ToolCache;
use crate::types::{Message, ToolDescriptor, Transcript};

use super::error::{WorkflowError, WorkflowResult};
use super::threads::ThreadStore;

/// Node names reported by [`AgentWorkflow::info`]
pub const WORKFLOW_NODES: [&str; 2] = ["agent", "tools"];

#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_rounds: u32,
    pub system_prompt: String,
}

impl From<&LlmSettings> for WorkflowSettings {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            max_rounds: settings.max_rounds.max(1),
            system_prompt: settings.system_prompt.clone(),
        }
    }
}

/// Result of one chat turn
#[derive(Debug, Clone)]
pub struct TurnOutput {
    pub thread_id: String,
    /// Messages produced in this turn, starting with the user query
    pub transcript: Transcript,
    pub outcome: ConversationOutcome,
    /// Number of model calls made
    pub model_rounds: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowInfo {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_rounds: u32,
    pub nodes: Vec<String>,
    pub checkpointer: String,
    pub threads: usize,
    pub tools_loaded: usize,
}

pub struct AgentWorkflow {
    provider: Arc<dyn Provider>,
    model: ProviderModelConfig,
    tools: Arc<ToolCache>,
    threads: ThreadStore,
    settings: WorkflowSettings,
    logger: Arc<dyn Logger>,
}

impl AgentWorkflow {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: ProviderModelConfig,
        tools: Arc<ToolCache>,
        settings: WorkflowSettings,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            provider,
            model,
            tools,
            threads: ThreadStore::new(),
            settings,
            logger,
        }
    }

    /// Build from the LLM section of the configuration
    pub fn from_settings(
        settings: &LlmSettings,
        provider: Arc<dyn Provider>,
        tools: Arc<ToolCache>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self::new(
            provider,
            ProviderModelConfig::from(settings),
            tools,
            WorkflowSettings::from(settings),
            logger,
        )
    }

    pub fn tools(&self) -> &Arc<ToolCache> {
        &self.tools
    }

    pub fn threads(&self) -> &ThreadStore {
        &self.threads
    }

    fn options(&self, tools: Vec<ToolDescriptor>) -> CompletionOptions {
        CompletionOptions::new()
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens)
            .with_system(self.settings.system_prompt.clone())
            .with_tools(tools)
    }

    /// Run one chat turn
    ///
    /// The model is called until it answers without requesting tools or
    /// `max_rounds` calls have been made. Tool failures are fed back to the
    /// model as error payloads. The turn is appended to the thread history
    /// only when it completes.
    pub async fn invoke(&self, query: &str, thread_id: Option<&str>) -> WorkflowResult<TurnOutput> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WorkflowError::EmptyQuery);
        }

        let thread_id = thread_id
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let tools = self.tools.tools().await?;
        let options = self.options(tools);
        let history = self.threads.history(&thread_id);

        self.logger.info(&format!(
            "[AgentWorkflow] thread={} history={} tools={}",
            thread_id,
            history.len(),
            options.tools.len()
        ));

        let mut turn: Transcript = vec![Message::user(query)];
        let mut model_rounds = 0;

        while model_rounds < self.settings.max_rounds {
            let mut messages = history.clone();
            messages.extend(turn.iter().cloned());

            let completion = self.provider.complete(&messages, &self.model, &options).await?;
            model_rounds += 1;

            let calls = completion.tool_calls.clone();
            turn.push(completion.into_message());
            if calls.is_empty() {
                break;
            }

            self.logger.debug(&format!(
                "[AgentWorkflow] round {} requested {} tool(s)",
                model_rounds,
                calls.len()
            ));
            turn.extend(self.tools.execute_tool_calls(&calls).await);
        }

        if turn.last().map(Message::is_tool_result).unwrap_or(false) {
            self.logger.warn(&format!(
                "[AgentWorkflow] stopped after {} rounds without a final answer",
                model_rounds
            ));
        }

        self.threads.append(&thread_id, &turn);
        let outcome = conversation::process(&turn);

        Ok(TurnOutput {
            thread_id,
            transcript: turn,
            outcome,
            model_rounds,
        })
    }

    pub fn info(&self) -> WorkflowInfo {
        WorkflowInfo {
            provider: self.provider.name().to_string(),
            model: self.model.model.clone(),
            temperature: self.settings.temperature,
            max_rounds: self.settings.max_rounds,
            nodes: WORKFLOW_NODES.iter().map(|n| n.to_string()).collect(),
            checkpointer: "memory".to_string(),
            threads: self.threads.len(),
            tools_loaded: self.tools.tool_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{OutcomeStatus, FALLBACK_RESPONSE};
    use crate::logging::NoOpLogger;
    use crate::providers::{Completion, ProviderError, ScriptedProvider};
    use crate::session::mock::{ScriptedConnector, ScriptedSession};
    use crate::session::{RetryPolicy, SessionError, SessionManager, SessionOptions};
    use crate::types::ToolInvocation;
    use serde_json::{json, Map, Value};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn cache(connector: ScriptedConnector) -> Arc<ToolCache> {
        let options = SessionOptions {
            url: "http://127.0.0.1:3000/mcp/".to_string(),
            protocol_version: "2025-03-26".to_string(),
            headers: BTreeMap::new(),
            timeout: Duration::from_secs(1),
            retry: RetryPolicy::none(),
            max_connection_attempts: 3,
        };
        let manager = Arc::new(SessionManager::new(options, Arc::new(connector), Arc::new(NoOpLogger)));
        Arc::new(ToolCache::new(manager, Arc::new(NoOpLogger)))
    }

    fn workflow(provider: Arc<ScriptedProvider>, tools: Arc<ToolCache>, max_rounds: u32) -> AgentWorkflow {
        let settings = LlmSettings {
            provider: "mock".to_string(),
            max_rounds,
            ..Default::default()
        };
        AgentWorkflow::from_settings(&settings, provider, tools, Arc::new(NoOpLogger))
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_list_open_prs_end_to_end() {
        let session = Arc::new(
            ScriptedSession::with_tools(&["listPullRequests", "getRepo"])
                .respond("listPullRequests", json!({"count": 2, "success": true})),
        );
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(Completion::tool_calls(vec![ToolInvocation::new(
                "call_1",
                "listPullRequests",
                args(json!({"owner": "o", "repo": "r", "state": "open"})),
            )])),
            Ok(Completion::text("Here are the results")),
        ]));
        let flow = workflow(provider.clone(), cache(ScriptedConnector::always(session.clone())), 8);

        let output = flow.invoke("list open PRs", Some("thread-1")).await.unwrap();

        assert_eq!(output.outcome.response, "Here are the results");
        assert_eq!(output.outcome.status, OutcomeStatus::Success);
        assert_eq!(output.outcome.tool_names(), vec!["listPullRequests".to_string()]);
        assert_eq!(output.outcome.used_tools[0].result, json!({"count": 2, "success": true}));
        assert_eq!(output.model_rounds, 2);
        assert_eq!(output.thread_id, "thread-1");
        assert_eq!(session.calls_for("listPullRequests")[0]["state"], json!("open"));

        let requests = provider.requests();
        assert_eq!(requests[0].tool_names, vec!["listPullRequests", "getRepo"]);
        assert!(requests[0].system.is_some());
        assert_eq!(requests[1].messages.len(), 3);
    }

    #[tokio::test]
    async fn test_thread_history_is_replayed() {
        let session = Arc::new(ScriptedSession::with_tools(&["getRepo"]));
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(Completion::text("first")),
            Ok(Completion::text("second")),
        ]));
        let flow = workflow(provider.clone(), cache(ScriptedConnector::always(session)), 8);

        flow.invoke("one", Some("t")).await.unwrap();
        let output = flow.invoke("two", Some("t")).await.unwrap();

        assert_eq!(output.outcome.response, "second");
        assert_eq!(output.transcript.len(), 2);
        assert_eq!(provider.requests()[1].messages.len(), 3);
        assert_eq!(flow.threads().history("t").len(), 4);
        assert_eq!(flow.info().threads, 1);
    }

    #[tokio::test]
    async fn test_tool_failure_is_fed_back() {
        let session = Arc::new(ScriptedSession::with_tools(&["getRepo"]).respond_error("getRepo", "Not Found"));
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(Completion::tool_calls(vec![ToolInvocation::new("c1", "getRepo", Map::new())])),
            Ok(Completion::text("The repository does not exist")),
        ]));
        let flow = workflow(provider.clone(), cache(ScriptedConnector::always(session)), 8);

        let output = flow.invoke("show repo", None).await.unwrap();
        assert_eq!(output.outcome.response, "The repository does not exist");
        let result = &output.outcome.used_tools[0].result;
        assert!(result["error"].as_str().unwrap().contains("Not Found"));
        assert!(!output.thread_id.is_empty());
    }

    #[tokio::test]
    async fn test_round_limit_stops_loop() {
        let session = Arc::new(ScriptedSession::with_tools(&["getRepo"]));
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(Completion::tool_calls(vec![ToolInvocation::new("c1", "getRepo", Map::new())])),
            Ok(Completion::tool_calls(vec![ToolInvocation::new("c2", "getRepo", Map::new())])),
            Ok(Completion::text("never reached")),
        ]));
        let flow = workflow(provider.clone(), cache(ScriptedConnector::always(session)), 2);

        let output = flow.invoke("loop", None).await.unwrap();
        assert_eq!(output.model_rounds, 2);
        assert_eq!(output.outcome.response, FALLBACK_RESPONSE);
        assert_eq!(output.outcome.used_tools.len(), 2);
        assert_eq!(provider.remaining(), 1);
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_network() {
        let connector = ScriptedConnector::failing(|_| SessionError::Connection("refused".into()));
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let flow = workflow(provider.clone(), cache(connector), 8);

        assert!(matches!(flow.invoke("   ", None).await, Err(WorkflowError::EmptyQuery)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_discovery_failure_is_connectivity_error() {
        let connector = ScriptedConnector::failing(|_| SessionError::Connection("refused".into()));
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let flow = workflow(provider.clone(), cache(connector), 8);

        let err = flow.invoke("hello", None).await.unwrap_err();
        assert!(err.is_connectivity());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_leaves_history_untouched() {
        let session = Arc::new(ScriptedSession::with_tools(&["getRepo"]));
        let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::api_error(
            "mock", "boom",
        ))]));
        let flow = workflow(provider, cache(ScriptedConnector::always(session)), 8);

        let err = flow.invoke("hello", Some("t")).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Provider(_)));
        assert!(flow.threads().history("t").is_empty());
    }

    #[test]
    fn test_info() {
        let session = Arc::new(ScriptedSession::with_tools(&[]));
        let flow = workflow(
            Arc::new(ScriptedProvider::new(vec![])),
            cache(ScriptedConnector::always(session)),
            5,
        );
        let info = flow.info();
        assert_eq!(info.nodes, vec!["agent", "tools"]);
        assert_eq!(info.checkpointer, "memory");
        assert_eq!(info.max_rounds, 5);
        assert_eq!(info.provider, "mock");
        assert_eq!(info.model, "gpt-4o");
    }
}
