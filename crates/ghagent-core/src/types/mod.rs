//! Core types shared by the session manager, the agent loop and the
//! conversation processor.

mod message;
mod tool;

pub use message::{arguments_from_value, Message};
pub use tool::{ToolDescriptor, ToolInvocation, ToolUsageRecord};

/// An ordered conversation turn
pub type Transcript = Vec<Message>;
