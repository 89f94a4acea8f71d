//! Minimal GitHub REST v3 client

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::GitHubSettings;

use super::error::{GitHubError, GitHubResult};
use super::models::{
    Branch, Commit, Contents, DeleteFileRequest, FileCommit, GitRef, PullFile, PullRequest,
    PutFileRequest, Repository,
};

const API_VERSION: &str = "2022-11-28";
const PER_PAGE: &str = "100";

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new(settings: &GitHubSettings) -> GitHubResult<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", settings.token.trim()))
            .map_err(|_| GitHubError::InvalidInput("GITHUB_TOKEN contains invalid characters".to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        if let Ok(agent) = HeaderValue::from_str(&settings.user_agent) {
            headers.insert(USER_AGENT, agent);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, subject: &str) -> GitHubResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GitHubError::from_status(status.as_u16(), subject, &body));
        }
        serde_json::from_str(&body).map_err(|e| GitHubError::Decode(e.to_string()))
    }

    async fn send_body<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        subject: &str,
    ) -> GitHubResult<T> {
        self.send(self.request(method, path).json(body), subject).await
    }

    pub async fn get_repository(&self, owner: &str, repo: &str) -> GitHubResult<Repository> {
        self.send(
            self.request(Method::GET, &format!("/repos/{}/{}", owner, repo)),
            &repo_subject(owner, repo),
        )
        .await
    }

    /// Topics are a separate endpoint; failures there leave the list empty
    pub async fn get_topics(&self, owner: &str, repo: &str) -> Vec<String> {
        #[derive(serde::Deserialize)]
        struct Topics {
            #[serde(default)]
            names: Vec<String>,
        }
        self.send::<Topics>(
            self.request(Method::GET, &format!("/repos/{}/{}/topics", owner, repo)),
            &repo_subject(owner, repo),
        )
        .await
        .map(|t| t.names)
        .unwrap_or_default()
    }

    pub async fn list_pulls(&self, owner: &str, repo: &str, state: &str) -> GitHubResult<Vec<PullRequest>> {
        let request = self
            .request(Method::GET, &format!("/repos/{}/{}/pulls", owner, repo))
            .query(&[("state", state), ("per_page", PER_PAGE)]);
        self.send(request, &repo_subject(owner, repo)).await
    }

    pub async fn get_pull(&self, owner: &str, repo: &str, number: u64) -> GitHubResult<PullRequest> {
        self.send(
            self.request(Method::GET, &format!("/repos/{}/{}/pulls/{}", owner, repo, number)),
            &format!("Pull request #{} in '{}/{}'", number, owner, repo),
        )
        .await
    }

    pub async fn list_pull_files(&self, owner: &str, repo: &str, number: u64) -> GitHubResult<Vec<PullFile>> {
        let request = self
            .request(Method::GET, &format!("/repos/{}/{}/pulls/{}/files", owner, repo, number))
            .query(&[("per_page", PER_PAGE)]);
        self.send(request, &format!("Pull request #{} in '{}/{}'", number, owner, repo))
            .await
    }

    /// File or directory at `path`; `HEAD` means the default branch
    pub async fn get_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> GitHubResult<Contents> {
        let mut request = self.request(Method::GET, &contents_path(owner, repo, path));
        if !git_ref.is_empty() && git_ref != "HEAD" {
            request = request.query(&[("ref", git_ref)]);
        }
        self.send(request, &format!("Path '{}' in '{}/{}'", path, owner, repo))
            .await
    }

    pub async fn put_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        body: &PutFileRequest,
    ) -> GitHubResult<FileCommit> {
        self.send_body(
            Method::PUT,
            &contents_path(owner, repo, path),
            body,
            &format!("Path '{}' in '{}/{}'", path, owner, repo),
        )
        .await
    }

    pub async fn delete_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        body: &DeleteFileRequest,
    ) -> GitHubResult<FileCommit> {
        self.send_body(
            Method::DELETE,
            &contents_path(owner, repo, path),
            body,
            &format!("Path '{}' in '{}/{}'", path, owner, repo),
        )
        .await
    }

    pub async fn get_branch(&self, owner: &str, repo: &str, branch: &str) -> GitHubResult<Branch> {
        self.send(
            self.request(Method::GET, &format!("/repos/{}/{}/branches/{}", owner, repo, branch)),
            &format!("Branch '{}' in '{}/{}'", branch, owner, repo),
        )
        .await
    }

    /// Create `refs/heads/{branch}` pointing at `sha`
    pub async fn create_branch_ref(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> GitHubResult<GitRef> {
        let body = serde_json::json!({
            "ref": format!("refs/heads/{}", branch),
            "sha": sha,
        });
        self.send_body(
            Method::POST,
            &format!("/repos/{}/{}/git/refs", owner, repo),
            &body,
            &repo_subject(owner, repo),
        )
        .await
    }

    pub async fn get_commit(&self, owner: &str, repo: &str, git_ref: &str) -> GitHubResult<Commit> {
        self.send(
            self.request(Method::GET, &format!("/repos/{}/{}/commits/{}", owner, repo, git_ref)),
            &format!("Commit '{}' in '{}/{}'", git_ref, owner, repo),
        )
        .await
    }

    /// `true` when the token can read the authenticated user
    pub async fn test_connection(&self) -> bool {
        self.request(Method::GET, "/user")
            .send()
            .await
            .map(|r| r.status() == StatusCode::OK)
            .unwrap_or(false)
    }
}

fn repo_subject(owner: &str, repo: &str) -> String {
    format!("Repository '{}/{}'", owner, repo)
}

fn contents_path(owner: &str, repo: &str, path: &str) -> String {
    format!("/repos/{}/{}/contents/{}", owner, repo, path.trim_start_matches('/'))
}
