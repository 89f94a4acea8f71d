//! Adapter between transcript types and genai types
//!
//! Auth comes from the resolved configuration (explicit key first), and
//! OpenAI-compatible hosts such as Azure are routed through a
//! `ServiceTargetResolver` onto genai's OpenAI adapter.

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, Tool as GenaiTool,
    ToolCall as GenaiToolCall, ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};
use serde_json::Value;

use crate::types::{arguments_from_value, Message, ToolDescriptor, ToolInvocation};

use super::traits::{CompletionOptions, ProviderModelConfig};

// ============================================================================
// Transcript -> genai
// ============================================================================

/// Convert a transcript to genai messages
///
/// An assistant turn that requested tools becomes its text (when present)
/// followed by a tool-call message; every tool result becomes a tool
/// response keyed by the correlation id.
pub fn to_genai_messages(messages: &[Message]) -> Vec<GenaiMessage> {
    let mut out = Vec::with_capacity(messages.len());

    for message in messages {
        match message {
            Message::User { content } => out.push(GenaiMessage::user(content.clone())),
            Message::Assistant { content, tool_calls } => {
                if tool_calls.is_empty() {
                    out.push(GenaiMessage::assistant(content.clone()));
                    continue;
                }
                if !content.trim().is_empty() {
                    out.push(GenaiMessage::assistant(content.clone()));
                }
                let calls: Vec<GenaiToolCall> = tool_calls.iter().map(to_genai_tool_call).collect();
                out.push(GenaiMessage::from(calls));
            }
            Message::ToolResult { tool_call_id, content, .. } => {
                out.push(GenaiMessage::from(GenaiToolResponse::new(
                    tool_call_id.clone(),
                    Message::render_payload(content),
                )));
            }
        }
    }

    out
}

pub fn to_genai_tool_call(call: &ToolInvocation) -> GenaiToolCall {
    GenaiToolCall {
        call_id: call.id.clone(),
        fn_name: call.name.clone(),
        fn_arguments: Value::Object(call.arguments.clone()),
        thought_signatures: None,
    }
}

pub fn to_genai_tool(tool: &ToolDescriptor) -> GenaiTool {
    let mut genai_tool = GenaiTool::new(tool.name.clone()).with_description(tool.description.clone());

    if tool.input_schema.is_object() {
        genai_tool = genai_tool.with_schema(tool.input_schema.clone());
    }

    genai_tool
}

pub fn to_genai_tools(tools: &[ToolDescriptor]) -> Vec<GenaiTool> {
    tools.iter().map(to_genai_tool).collect()
}

pub fn to_genai_options(options: &CompletionOptions) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = options.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }

    if let Some(max_tokens) = options.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    genai_opts
}

// ============================================================================
// genai -> transcript
// ============================================================================

pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolInvocation {
    ToolInvocation::new(
        tc.call_id.clone(),
        tc.fn_name.clone(),
        arguments_from_value(tc.fn_arguments.clone()),
    )
}

// ============================================================================
// Client creation
// ============================================================================

/// Provider configuration for routing
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier (e.g., "azure", "openai", "ollama")
    pub provider: String,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
}

impl ProviderConfig {
    pub fn new(provider: impl Into<String>, model: &ProviderModelConfig) -> Self {
        Self {
            provider: provider.into(),
            api_key: model.api_key.clone(),
            api_base: model.api_base.clone(),
        }
    }
}

/// Resolve the OpenAI-compatible base URL of an Azure resource
///
/// A bare resource endpoint (`https://name.openai.azure.com/`) maps to its
/// `openai/v1/` surface; an endpoint that already names a path under
/// `/openai/` is used as given.
pub fn azure_base_url(endpoint: &str) -> String {
    let mut base = endpoint.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    if base.contains("/openai/") {
        base
    } else {
        format!("{}openai/v1/", base)
    }
}

fn normalized_base(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Create a genai Client with explicit auth and endpoint resolution
pub fn create_client(config: &ProviderConfig) -> Client {
    let auth_explicit_key = config.api_key.clone();

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let explicit_key = auth_explicit_key.clone();
            Box::pin(async move {
                // None falls through to genai's own lookup (e.g. ollama needs no key)
                Ok(explicit_key.map(AuthData::from_single))
            })
        },
    );

    let target_provider = config.provider.to_lowercase();
    let target_api_base = config.api_base.clone();

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let (endpoint, adapter_kind) = match (target_provider.as_str(), target_api_base.as_ref()) {
                ("azure", Some(base)) => (Endpoint::from_owned(azure_base_url(base)), AdapterKind::OpenAI),
                ("openrouter", None) => (
                    Endpoint::from_static("https://openrouter.ai/api/v1/"),
                    AdapterKind::OpenAI,
                ),
                ("openai" | "openrouter", Some(base)) => {
                    (Endpoint::from_owned(normalized_base(base)), AdapterKind::OpenAI)
                }
                ("ollama", Some(base)) => {
                    (Endpoint::from_owned(normalized_base(base)), AdapterKind::Ollama)
                }
                _ => return Ok(target),
            };

            let model = ModelIden::new(adapter_kind, target.model.model_name.clone());
            Ok(ServiceTarget {
                endpoint,
                auth: target.auth,
                model,
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}

/// Check if a provider can be handled by genai (native or via OpenAI-compat)
pub fn is_genai_supported(provider: &str) -> bool {
    matches!(
        provider.to_lowercase().as_str(),
        "openai" | "anthropic" | "gemini" | "ollama" | "groq" | "deepseek" | "azure" | "openrouter"
    )
}
