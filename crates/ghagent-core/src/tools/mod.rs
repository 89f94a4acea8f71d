//! Tool discovery cache and execution
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  ToolCache                   │
//! │   - tools/list via manager   │
//! │   - TTL / invalidate()       │
//! │   - name filter              │
//! │   - tools/call → ToolResult  │
//! └──────────────────────────────┘
//!           │ SessionManager
//!           ▼
//! ┌──────────────────────────────┐
//! │  MCP server (GitHub + git)   │
//! └──────────────────────────────┘
//! ```

mod cache;
mod filter;

pub use cache::{is_error_payload, ToolCache};
pub use filter::ToolFilter;
