//! GitHub REST access
//!
//! [`GitHubClient`] wraps `reqwest` with the token, API version and media
//! type headers GitHub expects. Non-success statuses become [`GitHubError`]
//! values naming the resource that was requested.

mod client;
mod error;
pub mod models;

pub use client::GitHubClient;
pub use error::{GitHubError, GitHubResult};
