//! GitHub API errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubError {
    /// 404; carries a description of what was looked up
    #[error("{0} not found")]
    NotFound(String),

    /// 401
    #[error("Invalid GitHub token. Please check your token.")]
    Unauthorized,

    /// 403
    #[error("Access denied to {0}")]
    Forbidden(String),

    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected GitHub response: {0}")]
    Decode(String),

    #[error("{0}")]
    InvalidInput(String),
}

impl GitHubError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitHubError::NotFound(_))
    }

    /// Map a non-success status to an error about `subject`
    pub fn from_status(status: u16, subject: &str, body: &str) -> Self {
        match status {
            404 => GitHubError::NotFound(subject.to_string()),
            401 => GitHubError::Unauthorized,
            403 => GitHubError::Forbidden(subject.to_string()),
            _ => GitHubError::Api {
                status,
                message: api_message(body),
            },
        }
    }
}

/// The `message` field of a GitHub error body, or the raw body
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

pub type GitHubResult<T> = Result<T, GitHubError>;
