//! Read-only GitHub tools

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::github::models::{ContentItem, Contents};
use crate::github::{GitHubClient, GitHubError, GitHubResult};
use crate::utils::{format_file_size, is_binary_file, is_text, summarize_diff};

/// Patches longer than this are cut with [`summarize_diff`]
pub const MAX_PATCH_CHARS: usize = 2000;
/// Files at or above this size are listed without content
pub const MAX_INLINE_FILE_BYTES: u64 = 1024 * 1024;
const SUMMARY_LIST_LIMIT: usize = 10;
const PREVIEW_CHARS: usize = 200;

pub const PR_STATES: &[&str] = &["open", "closed", "all"];

fn day(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn iso(ts: Option<DateTime<Utc>>) -> Value {
    ts.map(|t| Value::String(t.to_rfc3339())).unwrap_or(Value::Null)
}

fn or_unset(value: &Option<String>, fallback: &str) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

pub async fn get_repo(client: &GitHubClient, owner: &str, repo: &str) -> Value {
    let repository = match client.get_repository(owner, repo).await {
        Ok(repository) => repository,
        Err(err) => return super::failure("Error", err),
    };
    let topics = if repository.topics.is_empty() {
        client.get_topics(owner, repo).await
    } else {
        repository.topics.clone()
    };
    let license = repository.license.as_ref().map(|l| l.name.clone());

    let summary = format!(
        "Repository: {}\nDescription: {}\nLanguage: {}\nStars: {}\nForks: {}\nOpen Issues: {}\nCreated: {}\nUpdated: {}\nDefault Branch: {}\nLicense: {}\nHomepage: {}",
        repository.full_name,
        or_unset(&repository.description, "No description"),
        or_unset(&repository.language, "Not specified"),
        repository.stargazers_count,
        repository.forks_count,
        repository.open_issues_count,
        day(repository.created_at),
        day(repository.updated_at),
        repository.default_branch,
        or_unset(&license, "Not specified"),
        or_unset(&repository.homepage, "Not specified"),
    );

    json!({
        "summary": summary,
        "data": {
            "id": repository.id,
            "name": repository.name,
            "full_name": repository.full_name,
            "description": repository.description,
            "language": repository.language,
            "stargazers_count": repository.stargazers_count,
            "forks_count": repository.forks_count,
            "open_issues_count": repository.open_issues_count,
            "created_at": iso(repository.created_at),
            "updated_at": iso(repository.updated_at),
            "default_branch": repository.default_branch,
            "license": license,
            "homepage": repository.homepage,
            "archived": repository.archived,
            "disabled": repository.disabled,
            "private": repository.private,
            "fork": repository.fork,
            "size": repository.size,
            "topics": topics,
            "url": repository.html_url,
            "clone_url": repository.clone_url,
            "ssh_url": repository.ssh_url,
        },
        "success": true,
    })
}

pub async fn list_pull_requests(client: &GitHubClient, owner: &str, repo: &str, state: &str) -> Value {
    if !PR_STATES.contains(&state) {
        return super::failure(
            "Error",
            GitHubError::InvalidInput(format!(
                "Invalid state '{}': expected one of {}",
                state,
                PR_STATES.join(", ")
            )),
        );
    }

    let pulls = match client.list_pulls(owner, repo, state).await {
        Ok(pulls) => pulls,
        Err(err) => return super::failure("Error", err),
    };

    let mut summary = format!("Pull requests in {}/{} ({}): {}\n", owner, repo, state, pulls.len());
    for pr in pulls.iter().take(SUMMARY_LIST_LIMIT * 2) {
        let _ = writeln!(
            summary,
            "  #{} {} (@{}, {}{})",
            pr.number,
            pr.title,
            pr.author(),
            pr.state,
            if pr.draft { ", draft" } else { "" }
        );
    }
    if pulls.len() > SUMMARY_LIST_LIMIT * 2 {
        let _ = write!(summary, "\n... and {} more", pulls.len() - SUMMARY_LIST_LIMIT * 2);
    }

    let data: Vec<Value> = pulls
        .iter()
        .map(|pr| {
            json!({
                "number": pr.number,
                "title": pr.title,
                "state": pr.state,
                "author": pr.author(),
                "draft": pr.draft,
                "created_at": iso(pr.created_at),
                "updated_at": iso(pr.updated_at),
                "merged_at": iso(pr.merged_at),
                "head": pr.head.ref_name,
                "base": pr.base.ref_name,
                "url": pr.html_url,
            })
        })
        .collect();

    json!({
        "summary": summary.trim_end(),
        "data": data,
        "count": data.len(),
        "success": true,
    })
}

/// Changed files of a pull request with truncated patches
pub async fn pr_diff_report(client: &GitHubClient, owner: &str, repo: &str, number: u64) -> GitHubResult<Value> {
    let pull = client.get_pull(owner, repo, number).await?;
    let files = client.list_pull_files(owner, repo, number).await?;

    let total_additions: u64 = files.iter().map(|f| f.additions).sum();
    let total_deletions: u64 = files.iter().map(|f| f.deletions).sum();

    let mut summary = format!(
        "Pull Request #{}: {}\nRepository: {}/{}\nAuthor: @{}\nState: {}\nFiles changed: {}\nTotal additions: +{}\nTotal deletions: -{}\n\nChanged files:\n",
        number,
        pull.title,
        owner,
        repo,
        pull.author(),
        pull.state,
        files.len(),
        total_additions,
        total_deletions
    );
    for file in files.iter().take(SUMMARY_LIST_LIMIT) {
        let _ = writeln!(
            summary,
            "  {} ({}) +{} -{}",
            file.filename, file.status, file.additions, file.deletions
        );
    }
    if files.len() > SUMMARY_LIST_LIMIT {
        let _ = write!(summary, "\n... and {} more files", files.len() - SUMMARY_LIST_LIMIT);
    }

    let data: Vec<Value> = files
        .iter()
        .map(|file| {
            let original_length = file.patch.as_ref().map(|p| p.chars().count()).unwrap_or(0);
            json!({
                "filename": file.filename,
                "status": file.status,
                "additions": file.additions,
                "deletions": file.deletions,
                "changes": file.changes,
                "patch": file.patch.as_deref().map(|p| summarize_diff(p, MAX_PATCH_CHARS)),
                "truncated": original_length > MAX_PATCH_CHARS,
                "original_length": original_length,
                "raw_url": file.raw_url,
            })
        })
        .collect();

    Ok(json!({
        "summary": summary,
        "data": data,
        "file_count": files.len(),
        "total_additions": total_additions,
        "total_deletions": total_deletions,
        "success": true,
    }))
}

pub async fn get_pr_diff(client: &GitHubClient, owner: &str, repo: &str, number: u64) -> Value {
    pr_diff_report(client, owner, repo, number)
        .await
        .unwrap_or_else(|err| super::failure("Error", err))
}

fn directory_report(owner: &str, repo: &str, path: &str, git_ref: &str, items: &[ContentItem]) -> Value {
    let files: Vec<Value> = items
        .iter()
        .map(|item| {
            json!({
                "name": item.name,
                "path": item.path,
                "type": item.kind,
                "size": item.size,
                "size_formatted": format_file_size(item.size),
                "url": item.html_url,
                "download_url": item.download_url,
            })
        })
        .collect();

    let mut summary = format!(
        "Directory: {}\nRepository: {}/{}\nReference: {}\nFiles: {}\n\nContents:\n",
        path,
        owner,
        repo,
        git_ref,
        items.len()
    );
    for item in items.iter().take(SUMMARY_LIST_LIMIT) {
        let _ = writeln!(summary, "  {} ({}, {})", item.name, item.kind, format_file_size(item.size));
    }
    if items.len() > SUMMARY_LIST_LIMIT {
        let _ = write!(summary, "\n... and {} more items", items.len() - SUMMARY_LIST_LIMIT);
    }

    json!({
        "summary": summary,
        "data": files,
        "success": true,
        "type": "directory",
        "file_count": items.len(),
    })
}

fn file_body(owner: &str, repo: &str, path: &str, git_ref: &str, item: &ContentItem) -> GitHubResult<Value> {
    let bytes = match item.decoded() {
        Some(decoded) => Some(decoded.map_err(|e| GitHubError::Decode(e.to_string()))?),
        None => None,
    };
    let text = bytes.as_deref().map(is_text).unwrap_or(false);
    let binary = is_binary_file(&item.name) || (bytes.is_some() && !text);

    let content = match &bytes {
        Some(bytes) if text && item.size < MAX_INLINE_FILE_BYTES => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        _ => None,
    };
    let content_size = content.as_ref().map(|c| c.chars().count()).unwrap_or(0);
    let note = if content.is_some() {
        None
    } else if item.size >= MAX_INLINE_FILE_BYTES {
        Some("File too large to display (>1MB)")
    } else if binary {
        Some("Binary file - content not displayed")
    } else {
        Some("Content not available")
    };

    let mut summary = format!(
        "File: {}\nRepository: {}/{}\nReference: {}\nOriginal Size: {}\nContent Size: {} characters\nType: {}\n\n",
        path,
        owner,
        repo,
        git_ref,
        format_file_size(item.size),
        content_size,
        if text { "Text" } else { "Binary" }
    );
    match (&content, note) {
        (Some(content), _) => {
            let preview: String = content.chars().take(PREVIEW_CHARS).collect();
            let _ = write!(summary, "Content preview (first {} chars):\n{}", PREVIEW_CHARS, preview);
            if content_size > PREVIEW_CHARS {
                summary.push_str("...");
            }
        }
        (None, Some(note)) => summary.push_str(note),
        (None, None) => {}
    }

    let mut data = json!({
        "name": item.name,
        "path": item.path,
        "type": item.kind,
        "original_size": item.size,
        "size_formatted": format_file_size(item.size),
        "encoding": item.encoding,
        "url": item.html_url,
        "download_url": item.download_url,
        "is_text": text,
        "is_binary": binary,
        "content": content,
        "content_size": content_size,
    });
    if let (Some(note), Some(map)) = (note, data.as_object_mut()) {
        map.insert("content_note".to_string(), json!(note));
    }

    Ok(json!({
        "summary": summary,
        "data": data,
        "success": true,
        "type": "file",
        "file_size": item.size,
    }))
}

/// File content or directory listing at `path`
pub async fn file_report(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    path: &str,
    git_ref: &str,
) -> GitHubResult<Value> {
    match client.get_contents(owner, repo, path, git_ref).await? {
        Contents::Directory(items) => Ok(directory_report(owner, repo, path, git_ref, &items)),
        Contents::File(item) => file_body(owner, repo, path, git_ref, &item),
    }
}

pub async fn get_file(client: &GitHubClient, owner: &str, repo: &str, path: &str, git_ref: &str) -> Value {
    file_report(client, owner, repo, path, git_ref)
        .await
        .unwrap_or_else(|err| super::failure("Error", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn item(name: &str, bytes: &[u8]) -> ContentItem {
        ContentItem {
            name: name.to_string(),
            path: format!("src/{}", name),
            kind: "file".to_string(),
            size: bytes.len() as u64,
            encoding: Some("base64".to_string()),
            content: Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
            ..Default::default()
        }
    }

    #[test]
    fn test_text_file_inlined() {
        let report = file_body("o", "r", "src/main.rs", "HEAD", &item("main.rs", b"fn main() {}\n")).unwrap();
        assert_eq!(report["type"], "file");
        assert_eq!(report["data"]["content"], "fn main() {}\n");
        assert_eq!(report["data"]["is_text"], true);
        assert!(report["data"].get("content_note").is_none());
        assert!(report["summary"].as_str().unwrap().contains("Content preview"));
    }

    #[test]
    fn test_binary_file_not_inlined() {
        let report = file_body("o", "r", "logo.png", "main", &item("logo.png", b"\x89PNG\x00\x00")).unwrap();
        assert_eq!(report["data"]["content"], Value::Null);
        assert_eq!(report["data"]["is_binary"], true);
        assert_eq!(report["data"]["content_note"], "Binary file - content not displayed");
    }

    #[test]
    fn test_large_file_not_inlined() {
        let mut large = item("big.txt", b"abc");
        large.size = MAX_INLINE_FILE_BYTES;
        large.content = None;
        let report = file_body("o", "r", "big.txt", "HEAD", &large).unwrap();
        assert_eq!(report["data"]["content_note"], "File too large to display (>1MB)");
        assert_eq!(report["data"]["content_size"], 0);
    }

    #[test]
    fn test_directory_listing() {
        let items: Vec<ContentItem> = (0..12).map(|i| item(&format!("f{}.rs", i), b"x")).collect();
        let report = directory_report("o", "r", "src", "HEAD", &items);
        assert_eq!(report["file_count"], 12);
        assert_eq!(report["data"][0]["size_formatted"], "1 B");
        assert!(report["summary"].as_str().unwrap().ends_with("... and 2 more items"));
    }
}
