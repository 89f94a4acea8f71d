//! Shared application state

use std::sync::Arc;

use ghagent_core::{AgentWorkflow, Logger, SessionManager, ToolCache};
use parking_lot::RwLock;

/// Readiness of the service as seen by `/health` and `/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppStatus {
    /// Warm-up still running
    Starting,
    Ready,
    /// Warm-up gave up; carries the last error
    ConnectFailed(String),
    /// On-demand discovery from `/chat` failed
    ConnectError(String),
}

impl AppStatus {
    pub fn label(&self) -> String {
        match self {
            AppStatus::Starting => "starting".to_string(),
            AppStatus::Ready => "ready".to_string(),
            AppStatus::ConnectFailed(reason) => format!("connecting_failed: {}", reason),
            AppStatus::ConnectError(reason) => format!("connect_error: {}", reason),
        }
    }
}

pub struct AppState {
    workflow: Arc<AgentWorkflow>,
    status: RwLock<AppStatus>,
    logger: Arc<dyn Logger>,
}

impl AppState {
    pub fn new(workflow: Arc<AgentWorkflow>, logger: Arc<dyn Logger>) -> Self {
        Self {
            workflow,
            status: RwLock::new(AppStatus::Starting),
            logger,
        }
    }

    pub fn workflow(&self) -> &Arc<AgentWorkflow> {
        &self.workflow
    }

    pub fn tools(&self) -> &Arc<ToolCache> {
        self.workflow.tools()
    }

    pub fn manager(&self) -> &Arc<SessionManager> {
        self.workflow.tools().manager()
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    pub fn status(&self) -> AppStatus {
        self.status.read().clone()
    }

    pub fn set_status(&self, status: AppStatus) {
        let mut current = self.status.write();
        if *current != status {
            self.logger
                .info(&format!("[AppState] status {} -> {}", current.label(), status.label()));
            *current = status;
        }
    }

    /// Load the tool list when the cache is empty
    ///
    /// An exhausted manager is given a fresh set of connection attempts
    /// first, so a request made after a failed warm-up retries discovery.
    pub async fn ensure_tools(&self) -> Result<usize, String> {
        if self.tools().cached().is_some() {
            return Ok(self.tools().tool_count());
        }

        if self.manager().is_exhausted() {
            self.manager().reset_connection_attempts();
        }

        match self.tools().refresh().await {
            Ok(tools) => {
                self.set_status(AppStatus::Ready);
                Ok(tools.len())
            }
            Err(err) => {
                let reason = err.to_string();
                self.set_status(AppStatus::ConnectError(reason.clone()));
                Err(reason)
            }
        }
    }
}
