//! Local git access for the working-copy tools

mod parse;
mod runner;

pub use parse::{parse_commit_hash, parse_oneline_log, parse_porcelain, parse_remotes, LogEntry, StatusEntry};
pub use runner::{GitError, GitOutput, GitRunner, DEFAULT_GIT_TIMEOUT};
