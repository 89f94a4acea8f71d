//! URI-addressed resources
//!
//! `gh-pr-diff://{owner}/{repo}/{number}` and
//! `gh-file://{owner}/{repo}/{path}[?ref=...]` resolve to JSON documents of
//! the form `{content, metadata}` where `content` is the serialized report.
//! Lookup failures produce an error document rather than a protocol error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};

use crate::github::GitHubClient;
use crate::tools::read::{file_report, pr_diff_report};

pub const PR_DIFF_TEMPLATE: &str = "gh-pr-diff://{owner}/{repo}/{number}";
pub const FILE_TEMPLATE: &str = "gh-file://{owner}/{repo}/{path}";
pub const JSON_MIME: &str = "application/json";

static FILE_URI: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^gh-file://([^/]+)/([^/]+)/(.+?)(?:\?ref=([^&]+))?$").ok());
static PR_DIFF_URI: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^gh-pr-diff://([^/]+)/([^/]+)/([^/?]+)$").ok());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    PrDiff {
        owner: String,
        repo: String,
        number: String,
    },
    File {
        owner: String,
        repo: String,
        path: String,
        git_ref: String,
    },
}

impl ResourceUri {
    pub fn parse(uri: &str) -> Result<Self, String> {
        if let Some(caps) = FILE_URI.as_ref().and_then(|re| re.captures(uri)) {
            return Ok(ResourceUri::File {
                owner: caps[1].to_string(),
                repo: caps[2].to_string(),
                path: caps[3].to_string(),
                git_ref: caps
                    .get(4)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| "HEAD".to_string()),
            });
        }
        if let Some(caps) = PR_DIFF_URI.as_ref().and_then(|re| re.captures(uri)) {
            return Ok(ResourceUri::PrDiff {
                owner: caps[1].to_string(),
                repo: caps[2].to_string(),
                number: caps[3].to_string(),
            });
        }
        Err(format!("Unsupported URI scheme: {}", uri))
    }

    /// Canonical form; file URIs always carry the ref
    pub fn canonical(&self) -> String {
        match self {
            ResourceUri::PrDiff { owner, repo, number } => {
                format!("gh-pr-diff://{}/{}/{}", owner, repo, number)
            }
            ResourceUri::File { owner, repo, path, git_ref } => {
                format!("gh-file://{}/{}/{}?ref={}", owner, repo, path, git_ref)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceDocument {
    pub content: String,
    pub metadata: Value,
}

impl ResourceDocument {
    fn new(report: &Value, mut metadata: Value) -> Self {
        let content = serde_json::to_string_pretty(report).unwrap_or_else(|_| report.to_string());
        if let Some(map) = metadata.as_object_mut() {
            map.insert("mime_type".to_string(), json!(JSON_MIME));
            map.insert("size".to_string(), json!(content.chars().count()));
        }
        Self { content, metadata }
    }

    fn error(uri: &str, name: String, description: String, error: impl ToString) -> Self {
        let report = json!({
            "error": error.to_string(),
            "success": false,
            "uri": uri,
        });
        Self::new(
            &report,
            json!({
                "name": name,
                "description": description,
                "uri": uri,
                "error": true,
            }),
        )
    }

    pub fn is_error(&self) -> bool {
        self.metadata.get("error").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.content.clone())
    }
}

/// Templates advertised through `resources/templates/list`
pub fn templates() -> Value {
    json!([
        {
            "uriTemplate": PR_DIFF_TEMPLATE,
            "name": "PR Diff",
            "description": "Diff for a GitHub pull request",
            "mimeType": JSON_MIME,
        },
        {
            "uriTemplate": FILE_TEMPLATE,
            "name": "GitHub File",
            "description": "GitHub file or directory; append ?ref= to pick a branch, tag or commit",
            "mimeType": JSON_MIME,
        },
    ])
}

async fn read_pr_diff(client: &GitHubClient, owner: &str, repo: &str, number: &str) -> ResourceDocument {
    let uri = format!("gh-pr-diff://{}/{}/{}", owner, repo, number);
    let error = |err: String| {
        ResourceDocument::error(
            &uri,
            format!("PR #{} Diff Error", number),
            format!("Error retrieving diff for PR #{}", number),
            err,
        )
    };

    let parsed = match number.parse::<u64>() {
        Ok(n) => n,
        Err(_) => return error(format!("Invalid pull request number '{}'", number)),
    };
    match pr_diff_report(client, owner, repo, parsed).await {
        Ok(report) => ResourceDocument::new(
            &report,
            json!({
                "name": format!("PR #{} Diff", number),
                "description": format!("Diff for pull request #{} in {}/{}", number, owner, repo),
                "uri": uri,
                "source": format!("https://github.com/{}/{}/pull/{}", owner, repo, number),
            }),
        ),
        Err(err) => error(err.to_string()),
    }
}

async fn read_file(client: &GitHubClient, owner: &str, repo: &str, path: &str, git_ref: &str) -> ResourceDocument {
    let uri = format!("gh-file://{}/{}/{}?ref={}", owner, repo, path, git_ref);
    let report = match file_report(client, owner, repo, path, git_ref).await {
        Ok(report) => report,
        Err(err) => {
            return ResourceDocument::error(
                &uri,
                format!("File Error: {}", path),
                format!("Error retrieving file {}", path),
                err,
            )
        }
    };

    let metadata = if report["type"] == "directory" {
        json!({
            "name": format!("Directory: {}", path),
            "description": format!("Directory contents for {} in {}/{}", path, owner, repo),
            "uri": uri,
            "source": format!("https://github.com/{}/{}/tree/{}/{}", owner, repo, git_ref, path),
            "type": "directory",
        })
    } else {
        json!({
            "name": format!("File: {}", path),
            "description": format!("File content for {} in {}/{}", path, owner, repo),
            "uri": uri,
            "source": format!("https://github.com/{}/{}/blob/{}/{}", owner, repo, git_ref, path),
            "type": "file",
            "original_size": report["file_size"],
            "content_size": report["data"]["content_size"],
        })
    };
    ResourceDocument::new(&report, metadata)
}

/// Resolve `uri` to a document; unknown schemes become error documents
pub async fn read(client: &GitHubClient, uri: &str) -> ResourceDocument {
    match ResourceUri::parse(uri) {
        Ok(ResourceUri::PrDiff { owner, repo, number }) => read_pr_diff(client, &owner, &repo, &number).await,
        Ok(ResourceUri::File { owner, repo, path, git_ref }) => {
            read_file(client, &owner, &repo, &path, &git_ref).await
        }
        Err(err) => ResourceDocument::error(
            uri,
            "Unsupported resource".to_string(),
            "The URI does not match a known resource template".to_string(),
            err,
        ),
    }
}
