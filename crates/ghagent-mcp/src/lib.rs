//! MCP server for GitHub repositories and a local git working copy
//!
//! Tools are served by [`GitHubMcp`] over Streamable HTTP (mounted into an
//! axum router by [`http_router`]) or over stdio.

pub mod config;
pub mod git;
pub mod github;
pub mod resources;
pub mod service;
pub mod tools;
pub mod utils;

use std::sync::Arc;

use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::StreamableHttpService;

pub use config::{git_workdir, layered_source, GitHubSettings, ListenSettings};
pub use git::GitRunner;
pub use github::{GitHubClient, GitHubError};
pub use service::GitHubMcp;

/// Router serving `server` at `path`; an empty path serves it at the root
pub fn http_router(server: GitHubMcp, path: &str) -> axum::Router {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        Default::default(),
    );
    if path.is_empty() {
        axum::Router::new().fallback_service(service)
    } else {
        axum::Router::new().nest_service(path, service)
    }
}
