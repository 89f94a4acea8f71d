//! Parsers for git's machine-readable output

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static COMMIT_LINE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^\[(?P<branch>[^\]\s]+)(?: \([^)]*\))? (?P<hash>[0-9a-f]{7,40})\]").ok()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    /// Two-letter XY code from `--porcelain`
    pub status: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub hash: String,
    pub message: String,
}

/// `git status --porcelain`
pub fn parse_porcelain(output: &str) -> Vec<StatusEntry> {
    output
        .lines()
        .filter(|line| line.len() > 3)
        .filter_map(|line| {
            let status = line.get(..2)?;
            let filename = line.get(3..)?;
            Some(StatusEntry {
                status: status.to_string(),
                filename: filename.to_string(),
            })
        })
        .collect()
}

/// `git log --oneline`
pub fn parse_oneline_log(output: &str) -> Vec<LogEntry> {
    output
        .lines()
        .filter_map(|line| {
            let (hash, message) = line.trim().split_once(' ')?;
            Some(LogEntry {
                hash: hash.to_string(),
                message: message.to_string(),
            })
        })
        .collect()
}

/// `git remote -v`; the first URL listed for each remote wins
pub fn parse_remotes(output: &str) -> BTreeMap<String, String> {
    let mut remotes = BTreeMap::new();
    for line in output.lines() {
        let mut parts = line.split_whitespace();
        if let (Some(name), Some(url)) = (parts.next(), parts.next()) {
            remotes
                .entry(name.to_string())
                .or_insert_with(|| url.to_string());
        }
    }
    remotes
}

/// Short hash from the `[branch hash] subject` line `git commit` prints
pub fn parse_commit_hash(output: &str) -> Option<String> {
    let pattern = COMMIT_LINE.as_ref()?;
    output
        .lines()
        .find_map(|line| pattern.captures(line.trim()))
        .map(|caps| caps["hash"].to_string())
}
