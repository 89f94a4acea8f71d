//! REST API payloads
//!
//! Only the fields the tools report are modelled; everything is defaulted
//! so partial payloads from older GitHub Enterprise versions still decode.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub default_branch: String,
    pub license: Option<License>,
    pub homepage: Option<String>,
    pub archived: bool,
    pub disabled: bool,
    pub private: bool,
    pub fork: bool,
    pub size: u64,
    pub topics: Vec<String>,
    pub html_url: String,
    pub clone_url: String,
    pub ssh_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub label: String,
    pub sha: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub user: Option<User>,
    pub html_url: String,
    pub draft: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub head: BranchRef,
    pub base: BranchRef,
}

impl PullRequest {
    pub fn author(&self) -> &str {
        self.user.as_ref().map(|u| u.login.as_str()).unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PullFile {
    pub filename: String,
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    pub patch: Option<String>,
    pub raw_url: Option<String>,
}

/// One entry of the contents API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentItem {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub size: u64,
    pub sha: String,
    pub encoding: Option<String>,
    pub content: Option<String>,
    pub html_url: Option<String>,
    pub download_url: Option<String>,
}

impl ContentItem {
    /// Decoded file bytes; `None` when the payload carries no inline content
    pub fn decoded(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        let content = self.content.as_ref()?;
        if self.encoding.as_deref() != Some("base64") {
            return Some(Ok(content.as_bytes().to_vec()));
        }
        let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
        Some(base64::engine::general_purpose::STANDARD.decode(compact))
    }
}

/// Response of `GET /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Contents {
    Directory(Vec<ContentItem>),
    File(ContentItem),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchCommit {
    pub sha: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Branch {
    pub name: String,
    pub commit: BranchCommit,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitObject {
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub object: GitObject,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitAuthor {
    pub name: String,
    pub email: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitDetail {
    pub message: String,
    pub author: Option<GitAuthor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitStats {
    pub additions: u64,
    pub deletions: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Commit {
    pub sha: String,
    pub html_url: String,
    pub commit: CommitDetail,
    pub stats: Option<CommitStats>,
    pub files: Vec<PullFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitRef {
    pub sha: String,
    pub html_url: Option<String>,
}

/// Response of the create/update/delete file endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCommit {
    pub content: Option<ContentItem>,
    pub commit: CommitRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

impl Committer {
    /// Both parts are needed; a lone name or email is ignored
    pub fn from_parts(name: Option<String>, email: Option<String>) -> Option<Self> {
        match (name, email) {
            (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => {
                Some(Self { name, email })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PutFileRequest {
    pub message: String,
    /// Base64 encoded file content
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committer: Option<Committer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteFileRequest {
    pub message: String,
    pub sha: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committer: Option<Committer>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contents_untagged() {
        let dir: Contents = serde_json::from_value(json!([
            {"name": "a.rs", "path": "src/a.rs", "type": "file", "size": 10}
        ]))
        .unwrap();
        assert!(matches!(dir, Contents::Directory(ref items) if items.len() == 1));

        let file: Contents = serde_json::from_value(json!({
            "name": "README.md", "path": "README.md", "type": "file", "size": 6,
            "encoding": "base64", "content": "aGVs\nbG8K\n"
        }))
        .unwrap();
        match file {
            Contents::File(item) => assert_eq!(item.decoded().unwrap().unwrap(), b"hello\n"),
            Contents::Directory(_) => panic!("expected a file"),
        }
    }

    #[test]
    fn test_repository_partial_payload() {
        let repo: Repository = serde_json::from_value(json!({
            "full_name": "octocat/hello",
            "created_at": "2020-01-02T03:04:05Z"
        }))
        .unwrap();
        assert_eq!(repo.full_name, "octocat/hello");
        assert!(repo.license.is_none());
        assert_eq!(repo.created_at.unwrap().format("%Y-%m-%d").to_string(), "2020-01-02");
    }

    #[test]
    fn test_committer_requires_both_parts() {
        assert!(Committer::from_parts(Some("a".into()), None).is_none());
        assert!(Committer::from_parts(Some("a".into()), Some("a@b.c".into())).is_some());
    }
}
