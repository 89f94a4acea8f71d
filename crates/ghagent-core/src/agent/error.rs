//! Workflow error types

use thiserror::Error;

use crate::providers::ProviderError;
use crate::session::SessionError;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("query must not be empty")]
    EmptyQuery,

    /// Tool discovery failed before the model was called
    #[error("tool discovery failed: {0}")]
    Tools(#[from] SessionError),

    #[error("model call failed: {0}")]
    Provider(#[from] ProviderError),
}

impl WorkflowError {
    /// Whether the failure is a connectivity problem with the tool server
    pub fn is_connectivity(&self) -> bool {
        matches!(self, WorkflowError::Tools(_))
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
