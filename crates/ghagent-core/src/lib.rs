//! ghagent core
//!
//! Runtime pieces shared by the chat service and its tests:
//!
//! - [`session`]: connection lifecycle for the MCP tool server (connect with
//!   retry and backoff, session headers, health snapshots)
//! - [`tools`]: cached tool discovery and tool execution on top of a session
//! - [`providers`]: LLM completion through `genai`, plus a scripted provider
//! - [`agent`]: the model/tool loop for one chat turn, with thread history
//! - [`conversation`]: tool usage records and final answer from a transcript
//! - [`config`], [`secrets`], [`logging`]: the ambient layers
//!
//! ```rust,ignore
//! use ghagent_core::{AgentWorkflow, AppConfig, EnvSecretStore, SessionManager, ToolCache};
//!
//! let config = AppConfig::load(None, &EnvSecretStore::new())?;
//! let manager = Arc::new(SessionManager::streamable_http(&config.mcp, logger.clone()));
//! let tools = Arc::new(ToolCache::new(manager, logger.clone()));
//! let provider = create_provider(&config.llm, logger.clone())?;
//! let workflow = AgentWorkflow::from_settings(&config.llm, provider, tools, logger);
//!
//! let turn = workflow.invoke("list open PRs in octocat/hello-world", None).await?;
//! println!("{}", turn.outcome.response);
//! ```

pub mod agent;
pub mod config;
pub mod conversation;
pub mod logging;
pub mod providers;
pub mod secrets;
pub mod session;
pub mod tools;
pub mod types;

pub use types::{Message, ToolDescriptor, ToolInvocation, ToolUsageRecord, Transcript};

pub use secrets::{
    ChainSecretStore, EnvSecretStore, MemorySecretStore, SecretInfo, SecretStore, SecretStoreError,
    SecretStoreResult,
};

pub use logging::{Logger, NoOpLogger, SharedLogger, TracingLogger};

pub use config::{AppConfig, ConfigError, ConfigResult};

pub use session::{ConnectionState, HealthStatus, SessionError, SessionHealth, SessionManager};

pub use tools::{ToolCache, ToolFilter};

pub use providers::{create_provider, Provider, ProviderError};

pub use conversation::{ConversationOutcome, OutcomeStatus};

pub use agent::{AgentWorkflow, TurnOutput, WorkflowError, WorkflowInfo};
