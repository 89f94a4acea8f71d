//! GenaiProvider - completion provider backed by the genai crate
//!
//! Handles genai-native providers as well as OpenAI-compatible hosts (Azure,
//! OpenRouter) routed through the `ServiceTargetResolver`.

use async_trait::async_trait;
use std::sync::Arc;

use genai::chat::ChatRequest;

use crate::logging::Logger;
use crate::types::Message;

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, from_genai_tool_call, is_genai_supported, to_genai_messages, to_genai_options,
    to_genai_tools, ProviderConfig,
};
use super::traits::{Completion, CompletionOptions, Provider, ProviderModelConfig};

pub struct GenaiProvider {
    provider_id: String,
    logger: Arc<dyn Logger>,
}

impl GenaiProvider {
    pub fn new(provider_id: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self {
            provider_id: provider_id.into(),
            logger,
        }
    }

    /// Check if this provider can handle the given provider ID
    pub fn supports(provider_id: &str) -> bool {
        is_genai_supported(provider_id)
    }

    /// Extract model name from a model string (e.g., "openai/gpt-4o" -> "gpt-4o")
    pub fn extract_model_name(model: &str) -> &str {
        model.split('/').nth(1).unwrap_or(model)
    }

    fn build_request(&self, messages: &[Message], options: &CompletionOptions) -> ChatRequest {
        let mut chat_req = ChatRequest::new(to_genai_messages(messages));

        if let Some(system) = options.system.as_deref().filter(|s| !s.trim().is_empty()) {
            chat_req = chat_req.with_system(system);
        }
        if !options.tools.is_empty() {
            chat_req = chat_req.with_tools(to_genai_tools(&options.tools));
        }

        chat_req
    }
}

#[async_trait]
impl Provider for GenaiProvider {
    fn name(&self) -> &str {
        &self.provider_id
    }

    fn default_api_base(&self) -> &str {
        match self.provider_id.as_str() {
            "openai" => "https://api.openai.com/v1/",
            "anthropic" => "https://api.anthropic.com/",
            "gemini" => "https://generativelanguage.googleapis.com/",
            "ollama" => "http://localhost:11434/",
            "groq" => "https://api.groq.com/openai/v1/",
            "deepseek" => "https://api.deepseek.com/",
            "openrouter" => "https://openrouter.ai/api/v1/",
            "azure" => "https://your-resource.openai.azure.com/openai/v1/",
            _ => "https://api.openai.com/v1/",
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        model_config: &ProviderModelConfig,
        options: &CompletionOptions,
    ) -> ProviderResult<Completion> {
        let model_name = Self::extract_model_name(&model_config.model);
        self.logger.info(&format!(
            "[GenaiProvider] complete: provider={}, model={}, messages={}, tools={}",
            self.provider_id,
            model_name,
            messages.len(),
            options.tools.len()
        ));

        let client = create_client(&ProviderConfig::new(self.provider_id.clone(), model_config));
        let chat_req = self.build_request(messages, options);
        let genai_options = to_genai_options(options);

        let response = client
            .exec_chat(model_name, chat_req, Some(&genai_options))
            .await
            .map_err(|e| {
                self.logger.error(&format!("[GenaiProvider] request failed: {}", e));
                ProviderError::api_error(self.provider_id.clone(), e.to_string())
            })?;

        let content = response.first_text().map(str::to_string).unwrap_or_default();
        let tool_calls: Vec<_> = response
            .into_tool_calls()
            .iter()
            .map(from_genai_tool_call)
            .collect();

        self.logger.debug(&format!(
            "[GenaiProvider] reply: {} chars, {} tool calls",
            content.len(),
            tool_calls.len()
        ));

        if content.is_empty() && tool_calls.is_empty() {
            return Err(ProviderError::invalid_response(
                self.provider_id.clone(),
                "reply carried neither text nor tool calls",
            ));
        }

        Ok(Completion { content, tool_calls })
    }
}
