//! LLM provider abstraction
//!
//! Real providers go through the `genai` crate, which handles the wire
//! protocols of OpenAI, Anthropic, Gemini, Ollama and friends. Azure and
//! other OpenAI-compatible hosts are routed with genai's
//! `ServiceTargetResolver`. The `mock` provider replies from a script (or
//! echoes) and never touches the network.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;

pub use traits::{Completion, CompletionOptions, Provider, ProviderModelConfig};
pub use error::{ProviderError, ProviderResult};
pub use genai_provider::GenaiProvider;
pub use genai_adapter::{azure_base_url, is_genai_supported, ProviderConfig};
pub use mock::{RecordedRequest, ScriptedProvider};

use crate::config::LlmSettings;
use crate::logging::Logger;
use std::sync::Arc;

/// Create the provider named by the LLM settings
///
/// Unknown provider ids are treated as OpenAI-compatible endpoints.
pub fn create_provider(settings: &LlmSettings, logger: Arc<dyn Logger>) -> ProviderResult<Arc<dyn Provider>> {
    let provider_id = settings.provider.to_lowercase();

    if provider_id == "mock" {
        return Ok(Arc::new(ScriptedProvider::echo(logger)));
    }
    if settings.requires_api_key() && settings.api_key.is_none() {
        return Err(ProviderError::missing_api_key(provider_id));
    }
    if provider_id == "azure" && settings.endpoint.is_none() {
        return Err(ProviderError::MissingEndpoint { provider: provider_id });
    }

    Ok(Arc::new(GenaiProvider::new(provider_id, logger)))
}
