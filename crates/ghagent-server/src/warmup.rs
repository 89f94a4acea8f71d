//! Background tool discovery at startup
//!
//! The HTTP server starts immediately; this task keeps trying to reach the
//! MCP server so the first chat request usually finds a warm cache.

use std::sync::Arc;
use std::time::Duration;

use ghagent_core::config::ServerSettings;

use crate::state::{AppState, AppStatus};

#[derive(Debug, Clone, Copy)]
pub struct WarmupPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl From<&ServerSettings> for WarmupPolicy {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            attempts: settings.warmup_attempts.max(1),
            delay: Duration::from_millis(settings.warmup_delay_ms),
        }
    }
}

/// Try discovery up to `policy.attempts` times; returns the final status
pub async fn warmup(state: Arc<AppState>, policy: WarmupPolicy) -> AppStatus {
    let logger = state.logger().clone();
    let mut last_error = String::new();

    for attempt in 1..=policy.attempts {
        logger.info(&format!(
            "[Warmup] MCP connection attempt {}/{}",
            attempt, policy.attempts
        ));

        if state.manager().is_exhausted() {
            state.manager().reset_connection_attempts();
        }

        match state.tools().refresh().await {
            Ok(tools) => {
                logger.info(&format!("[Warmup] MCP server ready with {} tools", tools.len()));
                state.set_status(AppStatus::Ready);
                return AppStatus::Ready;
            }
            Err(err) => {
                logger.warn(&format!(
                    "[Warmup] attempt {}/{} failed: {}",
                    attempt, policy.attempts, err
                ));
                last_error = err.to_string();
            }
        }

        if attempt < policy.attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }

    if state.tools().is_loaded() {
        // a chat request loaded the tools meanwhile
        return state.status();
    }

    logger.error("[Warmup] giving up; tools will be loaded on the next chat request");
    let status = AppStatus::ConnectFailed(last_error);
    state.set_status(status.clone());
    status
}

/// Run [`warmup`] on the runtime without waiting for it
pub fn spawn_warmup(state: Arc<AppState>, policy: WarmupPolicy) -> tokio::task::JoinHandle<AppStatus> {
    tokio::spawn(warmup(state, policy))
}
