//! Tool usage extraction and final answer selection

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Message, ToolUsageRecord};

/// Answer used when no assistant message carries text
pub const FALLBACK_RESPONSE: &str = "No response could be generated.";

/// Answer used when a transcript cannot be processed
pub const PROCESSING_FAILURE_RESPONSE: &str = "An error occurred while processing the result.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// Structured result of one conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationOutcome {
    pub response: String,
    #[serde(default)]
    pub used_tools: Vec<ToolUsageRecord>,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversationOutcome {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            response: PROCESSING_FAILURE_RESPONSE.to_string(),
            used_tools: Vec::new(),
            status: OutcomeStatus::Error,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    /// Names of the tools used, in call order
    pub fn tool_names(&self) -> Vec<String> {
        self.used_tools.iter().map(|t| t.name.clone()).collect()
    }
}

/// Pair every tool invocation with its result
///
/// For each assistant message, results are looked up by correlation id in
/// the run of tool-result messages that immediately follows it. Each result
/// is paired once. Invocations without a result in that run are skipped. Records keep transcript order,
/// left to right within one assistant message.
pub fn extract_used_tools(messages: &[Message]) -> Vec<ToolUsageRecord> {
    let mut records = Vec::new();

    for (index, message) in messages.iter().enumerate() {
        let calls = message.tool_calls();
        if calls.is_empty() {
            continue;
        }

        let results: Vec<(&str, &Value)> = messages[index + 1..]
            .iter()
            .map_while(|m| match m {
                Message::ToolResult { tool_call_id, content, .. } => {
                    Some((tool_call_id.as_str(), content))
                }
                _ => None,
            })
            .collect();

        // A result pairs with at most one invocation, so repeated ids
        // consume results in order.
        let mut used = vec![false; results.len()];
        for call in calls {
            let slot = (0..results.len()).find(|&i| !used[i] && results[i].0 == call.id);
            if let Some(i) = slot {
                used[i] = true;
                records.push(ToolUsageRecord {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                    result: results[i].1.clone(),
                });
            }
        }
    }

    records
}

/// Text of the last assistant message with non-empty content
pub fn extract_final_response(messages: &[Message]) -> String {
    messages
        .iter()
        .rev()
        .find_map(|m| match m {
            Message::Assistant { content, .. } if !content.trim().is_empty() => Some(content.clone()),
            _ => None,
        })
        .unwrap_or_else(|| FALLBACK_RESPONSE.to_string())
}

/// Process a typed transcript
pub fn process(messages: &[Message]) -> ConversationOutcome {
    ConversationOutcome {
        response: extract_final_response(messages),
        used_tools: extract_used_tools(messages),
        status: OutcomeStatus::Success,
        error: None,
    }
}

/// Process a raw JSON transcript
///
/// Accepts either a message array or an object with a `messages` array.
/// Anything that does not match the message shape yields a failure outcome
/// rather than an error.
pub fn process_value(raw: &Value) -> ConversationOutcome {
    let messages = match raw {
        Value::Array(_) => raw,
        Value::Object(map) => match map.get("messages") {
            Some(messages) => messages,
            None => return ConversationOutcome::failure("result has no 'messages' field"),
        },
        other => {
            return ConversationOutcome::failure(format!(
                "expected a message list, got {}",
                json_kind(other)
            ))
        }
    };

    match serde_json::from_value::<Vec<Message>>(messages.clone()) {
        Ok(messages) => process(&messages),
        Err(err) => ConversationOutcome::failure(err.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
