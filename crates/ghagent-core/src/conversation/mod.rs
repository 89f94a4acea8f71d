//! Conversation processing
//!
//! Turns a transcript into the records the chat API returns: the tools that
//! were used (with arguments and results) and one final answer.

mod processor;

pub use processor::{
    extract_final_response, extract_used_tools, process, process_value, ConversationOutcome,
    OutcomeStatus, FALLBACK_RESPONSE, PROCESSING_FAILURE_RESPONSE,
};
