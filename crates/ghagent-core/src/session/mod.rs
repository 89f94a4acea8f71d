//! Connection lifecycle for the MCP tool server
//!
//! - [`SessionManager`]: connect/disconnect state machine, session identity,
//!   retrying `tools/list` and `tools/call`, health snapshots
//! - [`RetryPolicy`]: bounded exponential backoff for transient failures
//! - [`McpConnector`]/[`McpSession`]: transport seam (Streamable HTTP via `rmcp`)
//! - [`mock`]: scripted connector and session for tests
//!
//! ```rust,ignore
//! let manager = SessionManager::streamable_http(&config.mcp, logger);
//! manager.connect().await?;
//! let tools = manager.get_tools().await?;
//! let payload = manager.call_tool("getRepo", args).await?;
//! ```

mod error;
mod headers;
mod manager;
mod retry;
mod transport;
pub mod mock;

pub use error::{root_cause, root_cause_message, SessionError, SessionResult};
pub use headers::{
    SessionHeaders, ACCEPT_STREAMABLE, HEADER_PROTOCOL_VERSION, HEADER_REQUEST_ID, HEADER_SESSION_ID,
};
pub use manager::{ConnectionState, HealthStatus, SessionHealth, SessionManager, SessionOptions};
pub use retry::RetryPolicy;
pub use transport::{payload_from_result, McpConnector, McpSession, RmcpSession, StreamableHttpConnector};
