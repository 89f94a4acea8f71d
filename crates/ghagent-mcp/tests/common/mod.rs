//! In-process stand-in for the GitHub REST API
//!
//! Knows one repository (`octo/hello`), a forbidden one (`octo/secret`),
//! two open pull requests and one closed, and a small mutable file tree.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use serde_json::{json, Value};

use ghagent_mcp::{GitHubClient, GitHubSettings};

pub const TOKEN: &str = "ghp_test_token";

#[derive(Clone, Default)]
pub struct MockGitHub {
    files: Arc<Mutex<BTreeMap<String, (Vec<u8>, String)>>>,
    refs: Arc<Mutex<Vec<String>>>,
    commits: Arc<AtomicU32>,
}

impl MockGitHub {
    pub fn new() -> Self {
        let mock = Self::default();
        mock.insert("README.md", b"# hello\n\nA test repository.\n");
        mock.insert("src/main.rs", b"fn main() {\n    println!(\"hi\");\n}\n");
        mock.insert("src/lib.rs", b"pub fn add(a: i32, b: i32) -> i32 { a + b }\n");
        mock.insert("assets/logo.png", b"\x89PNG\r\n\x1a\n\x00\x00\x00");
        mock
    }

    pub fn insert(&self, path: &str, bytes: &[u8]) {
        let sha = format!("sha-{}", path.replace('/', "-"));
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), (bytes.to_vec(), sha));
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).map(|(bytes, _)| bytes.clone())
    }

    pub fn refs(&self) -> Vec<String> {
        self.refs.lock().unwrap().clone()
    }

    fn next_commit(&self) -> String {
        format!("commit-{}", self.commits.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))).into_response()
}

fn check_repo(owner: &str, repo: &str) -> Result<(), Response> {
    match (owner, repo) {
        ("octo", "hello") => Ok(()),
        ("octo", "secret") => Err((
            StatusCode::FORBIDDEN,
            Json(json!({"message": "Resource not accessible by integration"})),
        )
            .into_response()),
        _ => Err(not_found()),
    }
}

async fn require_token(request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", TOKEN);
    let authorized = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Bad credentials"}))).into_response();
    }
    next.run(request).await
}

async fn repository(Path((owner, repo)): Path<(String, String)>) -> Response {
    if let Err(resp) = check_repo(&owner, &repo) {
        return resp;
    }
    Json(json!({
        "id": 1296269,
        "name": "hello",
        "full_name": "octo/hello",
        "description": "My first repository",
        "language": "Rust",
        "stargazers_count": 80,
        "forks_count": 9,
        "open_issues_count": 2,
        "created_at": "2021-01-26T19:01:12Z",
        "updated_at": "2024-05-01T10:00:00Z",
        "default_branch": "main",
        "license": {"name": "MIT License"},
        "homepage": null,
        "archived": false,
        "disabled": false,
        "private": false,
        "fork": false,
        "size": 108,
        "html_url": "https://github.com/octo/hello",
        "clone_url": "https://github.com/octo/hello.git",
        "ssh_url": "git@github.com:octo/hello.git"
    }))
    .into_response()
}

async fn topics() -> Json<Value> {
    Json(json!({"names": ["rust", "mcp"]}))
}

fn pull(number: u64, title: &str, state: &str, draft: bool) -> Value {
    json!({
        "number": number,
        "title": title,
        "state": state,
        "draft": draft,
        "user": {"login": "octocat"},
        "html_url": format!("https://github.com/octo/hello/pull/{}", number),
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-02T10:00:00Z",
        "merged_at": null,
        "head": {"ref": format!("feature-{}", number), "label": "", "sha": "h"},
        "base": {"ref": "main", "label": "", "sha": "b"}
    })
}

async fn pulls(
    Path((owner, repo)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = check_repo(&owner, &repo) {
        return resp;
    }
    let open = vec![pull(7, "Add login page", "open", false), pull(8, "WIP: dark mode", "open", true)];
    let closed = vec![pull(3, "Fix typo", "closed", false)];
    let list: Vec<Value> = match query.get("state").map(String::as_str).unwrap_or("open") {
        "closed" => closed,
        "all" => open.into_iter().chain(closed).collect(),
        _ => open,
    };
    Json(Value::Array(list)).into_response()
}

async fn pull_detail(Path((owner, repo, number)): Path<(String, String, u64)>) -> Response {
    if let Err(resp) = check_repo(&owner, &repo) {
        return resp;
    }
    if number != 7 {
        return not_found();
    }
    Json(pull(7, "Add login page", "open", false)).into_response()
}

async fn pull_files(Path((owner, repo, number)): Path<(String, String, u64)>) -> Response {
    if let Err(resp) = check_repo(&owner, &repo) {
        return resp;
    }
    if number != 7 {
        return not_found();
    }
    let long_patch = (0..300)
        .map(|i| format!("+line number {}", i))
        .collect::<Vec<_>>()
        .join("\n");
    Json(json!([
        {
            "filename": "src/login.rs",
            "status": "added",
            "additions": 300,
            "deletions": 0,
            "changes": 300,
            "patch": long_patch,
            "raw_url": "https://github.com/octo/hello/raw/h/src/login.rs"
        },
        {
            "filename": "README.md",
            "status": "modified",
            "additions": 2,
            "deletions": 1,
            "changes": 3,
            "patch": "@@ -1 +1,2 @@\n-# hello\n+# hello\n+Login added"
        }
    ]))
    .into_response()
}

fn content_item(path: &str, bytes: &[u8], sha: &str) -> Value {
    let name = path.rsplit('/').next().unwrap_or(path);
    json!({
        "name": name,
        "path": path,
        "type": "file",
        "size": bytes.len(),
        "sha": sha,
        "encoding": "base64",
        "content": base64::engine::general_purpose::STANDARD.encode(bytes),
        "html_url": format!("https://github.com/octo/hello/blob/main/{}", path),
        "download_url": format!("https://raw.githubusercontent.com/octo/hello/main/{}", path)
    })
}

async fn get_contents(
    State(mock): State<MockGitHub>,
    Path((owner, repo, path)): Path<(String, String, String)>,
) -> Response {
    if let Err(resp) = check_repo(&owner, &repo) {
        return resp;
    }
    let path = path.trim_start_matches('/').to_string();
    let files = mock.files.lock().unwrap();
    if let Some((bytes, sha)) = files.get(&path) {
        return Json(content_item(&path, bytes, sha)).into_response();
    }

    let prefix = format!("{}/", path);
    let entries: Vec<Value> = files
        .iter()
        .filter(|(p, _)| p.starts_with(&prefix))
        .map(|(p, (bytes, sha))| {
            let mut item = content_item(p, bytes, sha);
            if let Some(map) = item.as_object_mut() {
                map.remove("content");
                map.remove("encoding");
            }
            item
        })
        .collect();
    if entries.is_empty() {
        return not_found();
    }
    Json(Value::Array(entries)).into_response()
}

async fn put_contents(
    State(mock): State<MockGitHub>,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = check_repo(&owner, &repo) {
        return resp;
    }
    let path = path.trim_start_matches('/').to_string();
    let existing = mock.files.lock().unwrap().get(&path).map(|(_, sha)| sha.clone());
    if existing.as_deref() != body["sha"].as_str() {
        return (StatusCode::CONFLICT, Json(json!({"message": "sha mismatch"}))).into_response();
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(body["content"].as_str().unwrap_or_default())
        .unwrap_or_default();
    let commit = mock.next_commit();
    let sha = format!("blob-{}", commit);
    mock.files
        .lock()
        .unwrap()
        .insert(path.clone(), (bytes.clone(), sha.clone()));

    let status = if existing.is_some() { StatusCode::OK } else { StatusCode::CREATED };
    (
        status,
        Json(json!({
            "content": content_item(&path, &bytes, &sha),
            "commit": {"sha": commit, "html_url": "https://github.com/octo/hello/commit/x"}
        })),
    )
        .into_response()
}

async fn delete_contents(
    State(mock): State<MockGitHub>,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = check_repo(&owner, &repo) {
        return resp;
    }
    let path = path.trim_start_matches('/').to_string();
    let mut files = mock.files.lock().unwrap();
    match files.get(&path) {
        Some((_, sha)) if Some(sha.as_str()) == body["sha"].as_str() => {}
        Some(_) => return (StatusCode::CONFLICT, Json(json!({"message": "sha mismatch"}))).into_response(),
        None => return not_found(),
    }
    files.remove(&path);
    drop(files);
    Json(json!({"content": null, "commit": {"sha": mock.next_commit()}})).into_response()
}

async fn branch(Path((owner, repo, branch)): Path<(String, String, String)>) -> Response {
    if let Err(resp) = check_repo(&owner, &repo) {
        return resp;
    }
    if branch != "main" {
        return not_found();
    }
    Json(json!({"name": "main", "commit": {"sha": "mainsha123"}})).into_response()
}

async fn create_ref(
    State(mock): State<MockGitHub>,
    Path((owner, repo)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = check_repo(&owner, &repo) {
        return resp;
    }
    let name = body["ref"].as_str().unwrap_or_default().to_string();
    let mut refs = mock.refs.lock().unwrap();
    if refs.contains(&name) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "Reference already exists"})),
        )
            .into_response();
    }
    refs.push(name.clone());
    (
        StatusCode::CREATED,
        Json(json!({"ref": name, "object": {"sha": body["sha"], "type": "commit"}})),
    )
        .into_response()
}

async fn commit(Path((owner, repo, git_ref)): Path<(String, String, String)>) -> Response {
    if let Err(resp) = check_repo(&owner, &repo) {
        return resp;
    }
    if git_ref != "main" && git_ref != "HEAD" && git_ref != "mainsha123" {
        return not_found();
    }
    Json(json!({
        "sha": "mainsha123",
        "html_url": "https://github.com/octo/hello/commit/mainsha123",
        "commit": {
            "message": "Initial commit",
            "author": {"name": "Octo Cat", "email": "octo@example.com", "date": "2024-05-01T10:00:00Z"}
        },
        "stats": {"additions": 3, "deletions": 1, "total": 4},
        "files": [{"filename": "README.md", "status": "added", "additions": 3, "deletions": 1, "changes": 4}]
    }))
    .into_response()
}

pub fn router(mock: MockGitHub) -> Router {
    Router::new()
        .route("/repos/:owner/:repo", get(repository))
        .route("/repos/:owner/:repo/topics", get(topics))
        .route("/repos/:owner/:repo/pulls", get(pulls))
        .route("/repos/:owner/:repo/pulls/:number", get(pull_detail))
        .route("/repos/:owner/:repo/pulls/:number/files", get(pull_files))
        .route(
            "/repos/:owner/:repo/contents/*path",
            get(get_contents).put(put_contents).delete(delete_contents),
        )
        .route("/repos/:owner/:repo/branches/:branch", get(branch))
        .route("/repos/:owner/:repo/git/refs", post(create_ref))
        .route("/repos/:owner/:repo/commits/:git_ref", get(commit))
        .layer(middleware::from_fn(require_token))
        .with_state(mock)
}

/// Serve the mock on an ephemeral port; returns its base URL
pub async fn spawn_github(mock: MockGitHub) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(mock)).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn client(base_url: &str, token: &str) -> GitHubClient {
    GitHubClient::new(&GitHubSettings::new(token).with_api_url(base_url)).unwrap()
}
