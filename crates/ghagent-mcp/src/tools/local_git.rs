//! Working-copy git tools

use serde_json::{json, Value};

use crate::git::{parse_commit_hash, parse_oneline_log, parse_porcelain, parse_remotes, GitOutput, GitRunner};

pub const DEFAULT_LOG_LIMIT: u32 = 10;
pub const MAX_LOG_LIMIT: u32 = 100;

/// Runs git and folds spawn and timeout failures into a failed output
async fn run(runner: &GitRunner, args: &[&str]) -> GitOutput {
    match runner.run(args).await {
        Ok(output) => output,
        Err(err) => {
            tracing::warn!("{}", err);
            GitOutput {
                success: false,
                code: None,
                stdout: String::new(),
                stderr: err.to_string(),
                command: format!("git {}", args.join(" ")),
            }
        }
    }
}

fn rejected(error: impl Into<String>) -> Value {
    json!({ "success": false, "error": error.into() })
}

/// Remote and branch names are passed positionally; a leading dash would
/// turn them into options
fn is_safe_name(value: &str) -> bool {
    !value.is_empty() && !value.starts_with('-') && !value.chars().any(char::is_whitespace)
}

pub async fn status(runner: &GitRunner) -> Value {
    let output = run(runner, &["status", "--porcelain"]).await;
    if output.success {
        json!({
            "success": true,
            "files": parse_porcelain(&output.stdout),
            "raw_output": output.stdout,
        })
    } else {
        json!({
            "success": false,
            "error": output.error_text(),
            "raw_output": output.stderr,
        })
    }
}

pub async fn stage_all(runner: &GitRunner) -> Value {
    let output = run(runner, &["add", "--all"]).await;
    if output.success {
        json!({ "success": true, "message": "All changes staged." })
    } else {
        json!({ "success": false, "message": "Staging failed", "error": output.error_text() })
    }
}

pub async fn stage_files(runner: &GitRunner, files: &[String]) -> Value {
    let files: Vec<&str> = files
        .iter()
        .map(|f| f.as_str())
        .filter(|f| !f.trim().is_empty())
        .collect();
    if files.is_empty() {
        return rejected("No files specified for staging.");
    }

    let mut args = vec!["add", "--"];
    args.extend(files.iter().copied());
    let output = run(runner, &args).await;
    if output.success {
        json!({ "success": true, "message": format!("Staged files: {}", files.join(", ")) })
    } else {
        json!({ "success": false, "message": "Staging failed", "error": output.error_text() })
    }
}

pub async fn commit(runner: &GitRunner, message: &str) -> Value {
    if message.trim().is_empty() {
        return rejected("Commit message is required.");
    }

    let output = run(runner, &["commit", "-m", message]).await;
    if output.success {
        json!({
            "success": true,
            "message": "Commit created.",
            "commit_hash": parse_commit_hash(&output.stdout),
            "command": output.command,
        })
    } else {
        json!({
            "success": false,
            "message": "Commit failed",
            "commit_hash": null,
            "error": output.error_text(),
            "command": output.command,
        })
    }
}

pub async fn push(runner: &GitRunner, branch: &str, remote: &str) -> Value {
    if !is_safe_name(branch) || !is_safe_name(remote) {
        return rejected(format!("Invalid remote '{}' or branch '{}'", remote, branch));
    }

    let output = run(runner, &["push", remote, branch]).await;
    if output.success {
        json!({
            "success": true,
            "message": format!("Pushed {} to {}.", branch, remote),
        })
    } else {
        json!({ "success": false, "message": "Push failed", "error": output.error_text() })
    }
}

pub async fn log(runner: &GitRunner, limit: u32) -> Value {
    let limit = limit.clamp(1, MAX_LOG_LIMIT).to_string();
    let output = run(runner, &["log", "--oneline", "-n", &limit]).await;
    if output.success {
        json!({
            "success": true,
            "commits": parse_oneline_log(&output.stdout),
            "raw_output": output.stdout,
        })
    } else {
        json!({
            "success": false,
            "error": output.error_text(),
            "raw_output": output.stderr,
        })
    }
}

pub async fn current_branch(runner: &GitRunner) -> Value {
    let output = run(runner, &["branch", "--show-current"]).await;
    if output.success {
        json!({ "success": true, "current_branch": output.stdout.trim() })
    } else {
        json!({ "success": false, "current_branch": null, "error": output.error_text() })
    }
}

pub async fn remote_info(runner: &GitRunner) -> Value {
    let output = run(runner, &["remote", "-v"]).await;
    if output.success {
        json!({
            "success": true,
            "remotes": parse_remotes(&output.stdout),
            "raw_output": output.stdout,
        })
    } else {
        json!({
            "success": false,
            "error": output.error_text(),
            "raw_output": output.stderr,
        })
    }
}

/// Never reported as a tool error; a non-repository is a valid answer
pub async fn check_repository(runner: &GitRunner) -> Value {
    let output = run(runner, &["rev-parse", "--git-dir"]).await;
    json!({
        "is_git_repo": output.success,
        "git_dir": if output.success { Some(output.stdout.trim().to_string()) } else { None },
        "workdir": runner.workdir().display().to_string(),
        "error": if output.success { None } else { Some(output.error_text()) },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::is_success;

    fn runner() -> (tempfile::TempDir, GitRunner) {
        let dir = tempfile::tempdir().unwrap();
        let runner = GitRunner::new(dir.path());
        (dir, runner)
    }

    #[test]
    fn test_safe_names() {
        assert!(is_safe_name("origin"));
        assert!(is_safe_name("feature/login"));
        assert!(!is_safe_name("--force"));
        assert!(!is_safe_name("main extra"));
        assert!(!is_safe_name(""));
    }

    #[tokio::test]
    async fn test_input_rejected_before_running_git() {
        let (_dir, runner) = runner();
        assert_eq!(stage_files(&runner, &[]).await["error"], "No files specified for staging.");
        assert_eq!(stage_files(&runner, &["  ".to_string()]).await["success"], false);
        assert_eq!(commit(&runner, "   ").await["error"], "Commit message is required.");
        let pushed = push(&runner, "main", "--mirror").await;
        assert!(!is_success(&pushed));
        assert!(pushed["error"].as_str().unwrap().contains("--mirror"));
    }

    #[tokio::test]
    async fn test_non_repository_reports() {
        let (_dir, runner) = runner();
        let check = check_repository(&runner).await;
        assert_eq!(check["is_git_repo"], false);
        assert!(check["git_dir"].is_null());
        assert!(check["error"].is_string());

        let status = status(&runner).await;
        assert!(!is_success(&status));
        assert!(status["error"].is_string());
    }
}
