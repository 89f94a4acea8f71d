//! Chat turn orchestration
//!
//! [`AgentWorkflow`] alternates model calls and tool execution until the
//! model answers in plain text, then hands the turn's transcript to the
//! conversation processor. Thread history lives in an in-memory
//! [`ThreadStore`].

mod error;
mod threads;
mod workflow;

pub use error::{WorkflowError, WorkflowResult};
pub use threads::ThreadStore;
pub use workflow::{AgentWorkflow, TurnOutput, WorkflowInfo, WorkflowSettings, WORKFLOW_NODES};
