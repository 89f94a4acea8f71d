//! Scripted provider for tests and offline runs
//!
//! Replies are taken from a queue in order. Once the queue is empty the
//! provider either echoes the last user message or fails, depending on how
//! it was built.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use super::error::{ProviderError, ProviderResult};
use super::traits::{Completion, CompletionOptions, Provider, ProviderModelConfig};
use crate::logging::{Logger, NoOpLogger};
use crate::types::Message;

/// A request as seen by the scripted provider
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
    pub system: Option<String>,
}

pub struct ScriptedProvider {
    replies: Mutex<VecDeque<ProviderResult<Completion>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    echo_when_empty: bool,
    logger: Arc<dyn Logger>,
}

impl ScriptedProvider {
    /// Provider that returns `replies` in order, then fails
    pub fn new(replies: Vec<ProviderResult<Completion>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            echo_when_empty: false,
            logger: Arc::new(NoOpLogger),
        }
    }

    /// Provider that answers every request by echoing the last user message
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            echo_when_empty: true,
            logger,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn push(&self, reply: ProviderResult<Completion>) {
        self.replies.lock().push_back(reply);
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().len()
    }

    fn echo_reply(messages: &[Message]) -> Completion {
        let last_user = messages.iter().rev().find_map(|m| match m {
            Message::User { content } => Some(content.as_str()),
            _ => None,
        });
        Completion::text(format!("Echo: {}", last_user.unwrap_or_default()))
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_api_base(&self) -> &str {
        "mock://localhost"
    }

    async fn complete(
        &self,
        messages: &[Message],
        _model: &ProviderModelConfig,
        options: &CompletionOptions,
    ) -> ProviderResult<Completion> {
        self.requests.lock().push(RecordedRequest {
            messages: messages.to_vec(),
            tool_names: options.tools.iter().map(|t| t.name.clone()).collect(),
            system: options.system.clone(),
        });

        let next = self.replies.lock().pop_front();
        match next {
            Some(reply) => reply,
            None if self.echo_when_empty => {
                self.logger.debug("[ScriptedProvider] echoing last user message");
                Ok(Self::echo_reply(messages))
            }
            None => Err(ProviderError::Other("scripted provider has no replies left".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolInvocation;
    use serde_json::Map;

    #[tokio::test]
    async fn test_replies_in_order_then_fail() {
        let provider = ScriptedProvider::new(vec![
            Ok(Completion::tool_calls(vec![ToolInvocation::new("c1", "getRepo", Map::new())])),
            Ok(Completion::text("done")),
        ]);
        let model = ProviderModelConfig::new("test");
        let options = CompletionOptions::new();

        let first = provider.complete(&[Message::user("q")], &model, &options).await.unwrap();
        assert!(first.requests_tools());
        let second = provider.complete(&[Message::user("q")], &model, &options).await.unwrap();
        assert_eq!(second.content, "done");
        assert!(provider.complete(&[], &model, &options).await.is_err());
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_echo() {
        let provider = ScriptedProvider::echo(Arc::new(NoOpLogger));
        let reply = provider
            .complete(
                &[Message::user("hello"), Message::assistant("x")],
                &ProviderModelConfig::new("test"),
                &CompletionOptions::new(),
            )
            .await
            .unwrap();
        assert_eq!(reply.content, "Echo: hello");
    }
}
