//! GitHub tools that change repository state

use base64::Engine;
use serde_json::{json, Value};

use crate::github::models::{Committer, Contents, DeleteFileRequest, PutFileRequest};
use crate::github::{GitHubClient, GitHubError, GitHubResult};
use crate::utils::{validate_file_path, MAX_PATH_LEN};

pub const DEFAULT_BRANCH: &str = "main";

/// Arguments shared by the file-changing tools
#[derive(Debug, Clone)]
pub struct FileChange<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub path: &'a str,
    pub message: &'a str,
    pub branch: &'a str,
    pub committer: Option<Committer>,
}

fn invalid_path_report() -> Value {
    json!({
        "success": false,
        "error": "Invalid file path",
        "summary": format!(
            "File path must be relative, at most {} characters, without '..' segments or control characters",
            MAX_PATH_LEN
        ),
    })
}

/// SHA of the existing file, `None` when the path does not exist yet
async fn existing_sha(client: &GitHubClient, change: &FileChange<'_>) -> GitHubResult<Option<String>> {
    match client
        .get_contents(change.owner, change.repo, change.path, change.branch)
        .await
    {
        Ok(Contents::File(item)) => Ok(Some(item.sha)),
        Ok(Contents::Directory(_)) => Err(GitHubError::InvalidInput(format!(
            "'{}' is a directory",
            change.path
        ))),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

pub async fn create_or_update_file(client: &GitHubClient, change: FileChange<'_>, content: &str) -> Value {
    if !validate_file_path(change.path) {
        return invalid_path_report();
    }
    put_file(client, &change, content)
        .await
        .unwrap_or_else(|err| super::failure("Failed to create/update file", err))
}

async fn put_file(client: &GitHubClient, change: &FileChange<'_>, content: &str) -> GitHubResult<Value> {
    let sha = existing_sha(client, change).await?;
    let operation = if sha.is_some() { "updated" } else { "created" };
    let body = PutFileRequest {
        message: change.message.to_string(),
        content: base64::engine::general_purpose::STANDARD.encode(content.as_bytes()),
        sha,
        branch: change.branch.to_string(),
        committer: change.committer.clone(),
    };
    let commit = client.put_file(change.owner, change.repo, change.path, &body).await?;
    tracing::info!(path = change.path, branch = change.branch, "file {}", operation);

    Ok(json!({
        "success": true,
        "summary": format!("File '{}' {} successfully", change.path, operation),
        "data": {
            "operation": operation,
            "path": change.path,
            "commit_sha": commit.commit.sha,
            "commit_message": change.message,
            "branch": change.branch,
            "url": commit.content.and_then(|c| c.html_url),
        },
    }))
}

pub async fn delete_file(client: &GitHubClient, change: FileChange<'_>) -> Value {
    if !validate_file_path(change.path) {
        return invalid_path_report();
    }
    remove_file(client, &change)
        .await
        .unwrap_or_else(|err| super::failure("Failed to delete file", err))
}

async fn remove_file(client: &GitHubClient, change: &FileChange<'_>) -> GitHubResult<Value> {
    let sha = existing_sha(client, change)
        .await?
        .ok_or_else(|| GitHubError::NotFound(format!("Path '{}' in '{}/{}'", change.path, change.owner, change.repo)))?;
    let body = DeleteFileRequest {
        message: change.message.to_string(),
        sha,
        branch: change.branch.to_string(),
        committer: change.committer.clone(),
    };
    let commit = client
        .delete_file(change.owner, change.repo, change.path, &body)
        .await?;
    tracing::info!(path = change.path, branch = change.branch, "file deleted");

    Ok(json!({
        "success": true,
        "summary": format!("File '{}' deleted successfully", change.path),
        "data": {
            "operation": "deleted",
            "path": change.path,
            "commit_sha": commit.commit.sha,
            "commit_message": change.message,
            "branch": change.branch,
        },
    }))
}

pub async fn create_branch(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    new_branch: &str,
    base_branch: &str,
) -> Value {
    if new_branch.trim().is_empty() {
        return super::failure(
            "Failed to create branch",
            GitHubError::InvalidInput("Branch name is required".to_string()),
        );
    }

    branch_from(client, owner, repo, new_branch, base_branch)
        .await
        .unwrap_or_else(|err| super::failure("Failed to create branch", err))
}

async fn branch_from(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    new_branch: &str,
    base_branch: &str,
) -> GitHubResult<Value> {
    let base = client.get_branch(owner, repo, base_branch).await?;
    client
        .create_branch_ref(owner, repo, new_branch, &base.commit.sha)
        .await?;

    Ok(json!({
        "success": true,
        "summary": format!("Branch '{}' created successfully from '{}'", new_branch, base_branch),
        "data": {
            "operation": "branch_created",
            "new_branch": new_branch,
            "base_branch": base_branch,
            "base_commit_sha": base.commit.sha,
        },
    }))
}

pub async fn get_repository_status(client: &GitHubClient, owner: &str, repo: &str, git_ref: &str) -> Value {
    repository_status(client, owner, repo, git_ref)
        .await
        .unwrap_or_else(|err| super::failure("Failed to get repository status", err))
}

async fn repository_status(client: &GitHubClient, owner: &str, repo: &str, git_ref: &str) -> GitHubResult<Value> {
    let repository = client.get_repository(owner, repo).await?;
    let commit = client.get_commit(owner, repo, git_ref).await?;

    let branch_ref = if git_ref == "HEAD" {
        repository.default_branch.as_str()
    } else {
        git_ref
    };
    let (branch, is_default) = match client.get_branch(owner, repo, branch_ref).await {
        Ok(branch) => {
            let is_default = branch.name == repository.default_branch;
            (branch.name, is_default)
        }
        Err(err) if err.is_not_found() => ("detached HEAD".to_string(), false),
        Err(err) => return Err(err),
    };

    let author = commit.commit.author.as_ref();
    let stats = commit.stats.clone().unwrap_or_default();
    Ok(json!({
        "success": true,
        "summary": format!("Repository status for {}", git_ref),
        "data": {
            "commit_sha": commit.sha,
            "commit_message": commit.commit.message,
            "commit_author": author.map(|a| a.name.clone()),
            "commit_date": author.and_then(|a| a.date).map(|d| d.to_rfc3339()),
            "branch": branch,
            "is_default_branch": is_default,
            "files_changed": commit.files.len(),
            "additions": stats.additions,
            "deletions": stats.deletions,
        },
    }))
}
