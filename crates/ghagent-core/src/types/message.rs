//! Transcript message types
//!
//! A conversation turn is an ordered list of [`Message`]s. The set of
//! message kinds is closed: the orchestration loop only ever produces user
//! prompts, assistant turns (optionally requesting tools), and tool results
//! answering those requests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::tool::ToolInvocation;

/// One message of a conversation transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// Prompt submitted by the caller
    User { content: String },

    /// Model output; may request zero or more tool invocations
    Assistant {
        #[serde(default)]
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolInvocation>,
    },

    /// Result of one tool invocation, correlated through `tool_call_id`
    ToolResult {
        tool_call_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        content: Value,
    },
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    /// Create an assistant message without tool requests
    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Create an assistant message that requests tools
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolInvocation>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    /// Create a tool result answering the invocation with id `tool_call_id`
    pub fn tool_result(tool_call_id: impl Into<String>, content: Value) -> Self {
        Message::ToolResult {
            tool_call_id: tool_call_id.into(),
            name: None,
            content,
        }
    }

    /// Attach the tool name to a tool result (no-op for other kinds)
    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        if let Message::ToolResult { ref mut name, .. } = self {
            *name = Some(tool_name.into());
        }
        self
    }

    /// Tool invocations requested by this message
    pub fn tool_calls(&self) -> &[ToolInvocation] {
        match self {
            Message::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    /// Text content, if this kind carries text
    pub fn text(&self) -> Option<&str> {
        match self {
            Message::User { content } | Message::Assistant { content, .. } => Some(content),
            Message::ToolResult { .. } => None,
        }
    }

    /// Whether this is a tool result message
    pub fn is_tool_result(&self) -> bool {
        matches!(self, Message::ToolResult { .. })
    }

    /// Render a tool result payload as text for model consumption
    pub fn render_payload(content: &Value) -> String {
        match content {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Build an argument map from any JSON value; non-objects yield an empty map
pub fn arguments_from_value(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_serde_tags() {
        let msg = Message::user("hi");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"role": "user", "content": "hi"}));

        let parsed: Message = serde_json::from_value(json!({
            "role": "tool_result",
            "tool_call_id": "c1",
            "content": {"ok": true}
        }))
        .unwrap();
        assert_eq!(parsed, Message::tool_result("c1", json!({"ok": true})));
    }

    #[test]
    fn test_assistant_defaults() {
        let parsed: Message = serde_json::from_value(json!({"role": "assistant"})).unwrap();
        assert_eq!(parsed, Message::assistant(""));
        assert!(parsed.tool_calls().is_empty());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let parsed = serde_json::from_value::<Message>(json!({"role": "system", "content": "x"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_with_tool_name() {
        let msg = Message::tool_result("c1", json!("done")).with_tool_name("getRepo");
        match msg {
            Message::ToolResult { name, .. } => assert_eq!(name.as_deref(), Some("getRepo")),
            _ => panic!("expected tool result"),
        }

        let untouched = Message::user("x").with_tool_name("ignored");
        assert_eq!(untouched, Message::user("x"));
    }

    #[test]
    fn test_render_payload() {
        assert_eq!(Message::render_payload(&json!("plain")), "plain");
        assert_eq!(Message::render_payload(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(Message::render_payload(&Value::Null), "");
    }

    #[test]
    fn test_arguments_from_value() {
        assert_eq!(arguments_from_value(json!({"a": 1})).len(), 1);
        assert_eq!(arguments_from_value(json!(r#"{"b": 2}"#)).get("b"), Some(&json!(2)));
        assert!(arguments_from_value(json!([1, 2])).is_empty());
        assert!(arguments_from_value(json!("not json")).is_empty());
    }
}
