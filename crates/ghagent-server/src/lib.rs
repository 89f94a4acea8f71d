//! Chat service for the GitHub agent
//!
//! `POST /chat` runs one agent turn against tools discovered from the MCP
//! server; `/health`, `/workflow/info` and `/` report on the service.

pub mod error;
pub mod routes;
pub mod state;
pub mod types;
pub mod warmup;

use std::sync::Arc;

use ghagent_core::config::AppConfig;
use ghagent_core::tools::ToolFilter;
use ghagent_core::{create_provider, AgentWorkflow, Logger, ProviderError, SessionManager, ToolCache};

pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::{AppState, AppStatus};
pub use warmup::{spawn_warmup, warmup, WarmupPolicy};

/// Wire the session manager, tool cache, provider and workflow from config
pub fn build_state(config: &AppConfig, logger: Arc<dyn Logger>) -> Result<Arc<AppState>, ProviderError> {
    let manager = Arc::new(SessionManager::streamable_http(&config.mcp, logger.clone()));
    let tools = Arc::new(
        ToolCache::new(manager, logger.clone())
            .with_ttl(config.mcp.tool_cache_ttl())
            .with_filter(ToolFilter::from(&config.tools)),
    );
    let provider = create_provider(&config.llm, logger.clone())?;
    let workflow = Arc::new(AgentWorkflow::from_settings(&config.llm, provider, tools, logger.clone()));
    Ok(Arc::new(AppState::new(workflow, logger)))
}
