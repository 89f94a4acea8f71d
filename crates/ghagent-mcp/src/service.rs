//! rmcp tool and resource surface

use rmcp::handler::server::{tool::ToolRouter, wrapper::Parameters};
use rmcp::model::{
    CallToolResult, Content, Implementation, ListResourceTemplatesResult, PaginatedRequestParams,
    ReadResourceRequestParams, ReadResourceResult, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::git::GitRunner;
use crate::github::models::Committer;
use crate::github::GitHubClient;
use crate::resources::{self, JSON_MIME};
use crate::tools::{self, local_git, read, write};

const INSTRUCTIONS: &str = "GitHub repository tools (repository info, pull requests, diffs, files, \
branches and file commits) plus git commands against the server's local working copy. \
Every tool returns JSON with a human-readable `summary`.";

fn default_state() -> String {
    "open".to_string()
}

fn default_ref() -> String {
    "HEAD".to_string()
}

fn default_branch() -> String {
    write::DEFAULT_BRANCH.to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_log_limit() -> u32 {
    local_git::DEFAULT_LOG_LIMIT
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RepoRequest {
    #[schemars(description = "Repository owner (user or organization)")]
    pub owner: String,
    #[schemars(description = "Repository name")]
    pub repo: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListPullRequestsRequest {
    pub owner: String,
    pub repo: String,
    #[schemars(description = "open, closed or all (default open)")]
    #[serde(default = "default_state")]
    pub state: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PrDiffRequest {
    pub owner: String,
    pub repo: String,
    #[schemars(description = "Pull request number")]
    pub number: u64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetFileRequest {
    pub owner: String,
    pub repo: String,
    #[schemars(description = "File or directory path inside the repository")]
    pub path: String,
    #[schemars(description = "Branch, tag or commit SHA (default HEAD)")]
    #[serde(default = "default_ref", rename = "ref")]
    pub git_ref: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WriteFileRequest {
    pub owner: String,
    pub repo: String,
    pub path: String,
    #[schemars(description = "Full new file content (UTF-8 text)")]
    pub content: String,
    #[schemars(description = "Commit message")]
    pub message: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    pub committer_name: Option<String>,
    pub committer_email: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteFileRequest {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub message: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    pub committer_name: Option<String>,
    pub committer_email: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateBranchRequest {
    pub owner: String,
    pub repo: String,
    #[schemars(description = "Name of the branch to create")]
    pub new_branch: String,
    #[schemars(description = "Branch to start from (default main)")]
    #[serde(default = "default_branch")]
    pub base_branch: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RepositoryStatusRequest {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_ref", rename = "ref")]
    pub git_ref: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StageFilesRequest {
    #[schemars(description = "Paths relative to the working copy")]
    pub files: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CommitRequest {
    pub message: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PushRequest {
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_remote")]
    pub remote: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogRequest {
    #[schemars(description = "Number of commits (1-100, default 10)")]
    #[serde(default = "default_log_limit")]
    pub limit: u32,
}

/// Wrap a report; `success: false` is flagged as a tool error
fn report(value: Value) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(&value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    let content = vec![Content::text(text)];
    if tools::is_success(&value) {
        Ok(CallToolResult::success(content))
    } else {
        Ok(CallToolResult::error(content))
    }
}

#[derive(Clone)]
pub struct GitHubMcp {
    github: GitHubClient,
    git: GitRunner,
    tool_router: ToolRouter<Self>,
}

impl GitHubMcp {
    pub fn new(github: GitHubClient, git: GitRunner) -> Self {
        Self {
            github,
            git,
            tool_router: Self::tool_router(),
        }
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        names
    }
}

#[tool_router]
impl GitHubMcp {
    #[tool(name = "health", description = "Health check")]
    async fn health(&self) -> Result<CallToolResult, McpError> {
        report(json!({ "status": "ok" }))
    }

    #[tool(
        name = "getRepo",
        description = "Get repository information: description, language, stars, forks, license and URLs"
    )]
    async fn get_repo(&self, Parameters(req): Parameters<RepoRequest>) -> Result<CallToolResult, McpError> {
        report(read::get_repo(&self.github, &req.owner, &req.repo).await)
    }

    #[tool(name = "listPullRequests", description = "List pull requests of a repository")]
    async fn list_pull_requests(
        &self,
        Parameters(req): Parameters<ListPullRequestsRequest>,
    ) -> Result<CallToolResult, McpError> {
        report(read::list_pull_requests(&self.github, &req.owner, &req.repo, &req.state).await)
    }

    #[tool(
        name = "getPRDiff",
        description = "Get the changed files and (truncated) patches of a pull request"
    )]
    async fn get_pr_diff(&self, Parameters(req): Parameters<PrDiffRequest>) -> Result<CallToolResult, McpError> {
        report(read::get_pr_diff(&self.github, &req.owner, &req.repo, req.number).await)
    }

    #[tool(
        name = "getFile",
        description = "Get a file's content (text files under 1 MB) or a directory listing"
    )]
    async fn get_file(&self, Parameters(req): Parameters<GetFileRequest>) -> Result<CallToolResult, McpError> {
        report(read::get_file(&self.github, &req.owner, &req.repo, &req.path, &req.git_ref).await)
    }

    #[tool(
        name = "createOrUpdateFile",
        description = "Create a file or replace its content with a single commit"
    )]
    async fn create_or_update_file(
        &self,
        Parameters(req): Parameters<WriteFileRequest>,
    ) -> Result<CallToolResult, McpError> {
        let change = write::FileChange {
            owner: &req.owner,
            repo: &req.repo,
            path: &req.path,
            message: &req.message,
            branch: &req.branch,
            committer: Committer::from_parts(req.committer_name.clone(), req.committer_email.clone()),
        };
        report(write::create_or_update_file(&self.github, change, &req.content).await)
    }

    #[tool(name = "deleteFile", description = "Delete a file with a single commit")]
    async fn delete_file(&self, Parameters(req): Parameters<DeleteFileRequest>) -> Result<CallToolResult, McpError> {
        let change = write::FileChange {
            owner: &req.owner,
            repo: &req.repo,
            path: &req.path,
            message: &req.message,
            branch: &req.branch,
            committer: Committer::from_parts(req.committer_name.clone(), req.committer_email.clone()),
        };
        report(write::delete_file(&self.github, change).await)
    }

    #[tool(name = "createBranch", description = "Create a branch from the head of another branch")]
    async fn create_branch(&self, Parameters(req): Parameters<CreateBranchRequest>) -> Result<CallToolResult, McpError> {
        report(write::create_branch(&self.github, &req.owner, &req.repo, &req.new_branch, &req.base_branch).await)
    }

    #[tool(
        name = "getRepositoryStatus",
        description = "Last commit, author, branch and change stats for a ref"
    )]
    async fn get_repository_status(
        &self,
        Parameters(req): Parameters<RepositoryStatusRequest>,
    ) -> Result<CallToolResult, McpError> {
        report(write::get_repository_status(&self.github, &req.owner, &req.repo, &req.git_ref).await)
    }

    #[tool(name = "gitStatus", description = "Changed files in the local working copy (git status)")]
    async fn git_status(&self) -> Result<CallToolResult, McpError> {
        report(local_git::status(&self.git).await)
    }

    #[tool(name = "gitStageAll", description = "Stage every change in the local working copy")]
    async fn git_stage_all(&self) -> Result<CallToolResult, McpError> {
        report(local_git::stage_all(&self.git).await)
    }

    #[tool(name = "gitStageFiles", description = "Stage specific files in the local working copy")]
    async fn git_stage_files(&self, Parameters(req): Parameters<StageFilesRequest>) -> Result<CallToolResult, McpError> {
        report(local_git::stage_files(&self.git, &req.files).await)
    }

    #[tool(name = "gitCommit", description = "Commit staged changes in the local working copy")]
    async fn git_commit(&self, Parameters(req): Parameters<CommitRequest>) -> Result<CallToolResult, McpError> {
        report(local_git::commit(&self.git, &req.message).await)
    }

    #[tool(name = "gitPush", description = "Push a local branch to a remote")]
    async fn git_push(&self, Parameters(req): Parameters<PushRequest>) -> Result<CallToolResult, McpError> {
        report(local_git::push(&self.git, &req.branch, &req.remote).await)
    }

    #[tool(name = "gitLog", description = "Recent commits of the local working copy")]
    async fn git_log(&self, Parameters(req): Parameters<LogRequest>) -> Result<CallToolResult, McpError> {
        report(local_git::log(&self.git, req.limit).await)
    }

    #[tool(name = "gitCurrentBranch", description = "Current branch of the local working copy")]
    async fn git_current_branch(&self) -> Result<CallToolResult, McpError> {
        report(local_git::current_branch(&self.git).await)
    }

    #[tool(name = "gitRemoteInfo", description = "Configured remotes of the local working copy")]
    async fn git_remote_info(&self) -> Result<CallToolResult, McpError> {
        report(local_git::remote_info(&self.git).await)
    }

    #[tool(
        name = "gitCheckRepository",
        description = "Check whether the server's working directory is a git repository"
    )]
    async fn git_check_repository(&self) -> Result<CallToolResult, McpError> {
        report(local_git::check_repository(&self.git).await)
    }
}

#[tool_handler]
impl ServerHandler for GitHubMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        serde_json::from_value(json!({ "resourceTemplates": resources::templates() }))
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let document = resources::read(&self.github, &request.uri).await;
        if document.is_error() {
            tracing::warn!(uri = %request.uri, "resource lookup failed");
        }
        serde_json::from_value(json!({
            "contents": [{
                "uri": request.uri,
                "mimeType": JSON_MIME,
                "text": document.to_json(),
            }]
        }))
        .map_err(|e| McpError::internal_error(e.to_string(), None))
    }
}
