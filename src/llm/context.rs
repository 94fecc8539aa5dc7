//! Conversation history
//!
//! One session's turns, in order, append-only. The conversation loop owns
//! the history; the chat engine appends the intermediate tool and assistant
//! turns it produces while answering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message in the conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// System prompt/instructions
    System,
    /// User input
    User,
    /// Assistant response
    Assistant,
    /// Tool result
    Tool,
}

impl MessageRole {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

/// One tool call the model requested in an assistant turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Call id, echoed back in the matching tool turn
    pub id: String,

    /// Name of the tool being called
    pub name: String,

    /// Raw JSON arguments as produced by the model
    pub arguments: String,
}

/// A single message in the conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Role of the message sender
    pub role: MessageRole,

    /// Message content (may be empty for pure tool-call turns)
    pub content: String,

    /// Tool calls requested by this turn (assistant turns only)
    pub tool_calls: Vec<ToolInvocation>,

    /// Id of the call this turn answers (tool turns only)
    pub tool_call_id: Option<String>,

    /// When the message was created
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Create an assistant turn that requests tool calls
    pub fn assistant_tool_calls(
        content: impl Into<String>,
        tool_calls: Vec<ToolInvocation>,
    ) -> Self {
        let mut msg = Self::new(MessageRole::Assistant, content);
        msg.tool_calls = tool_calls;
        msg
    }

    /// Create a tool result turn answering the given call id
    pub fn tool(content: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        let mut msg = Self::new(MessageRole::Tool, content);
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }
}

/// Append-only conversation history for one session
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChatHistory {
    messages: Vec<ConversationMessage>,
}

impl ChatHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn
    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.messages.push(ConversationMessage::user(content));
    }

    /// Append an assistant turn
    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.messages.push(ConversationMessage::assistant(content));
    }

    /// Append an assistant turn that requests tool calls
    pub fn add_assistant_tool_calls(
        &mut self,
        content: impl Into<String>,
        tool_calls: Vec<ToolInvocation>,
    ) {
        self.messages
            .push(ConversationMessage::assistant_tool_calls(content, tool_calls));
    }

    /// Append a tool result turn
    pub fn add_tool_message(
        &mut self,
        content: impl Into<String>,
        tool_call_id: impl Into<String>,
    ) {
        self.messages
            .push(ConversationMessage::tool(content, tool_call_id));
    }

    /// All messages, oldest first
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Number of messages in the history
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_ordered_and_append_only() {
        let mut history = ChatHistory::new();
        history.add_user_message("how many wells are in Texas?");
        history.add_assistant_tool_calls(
            "",
            vec![ToolInvocation {
                id: "call_0".into(),
                name: "query".into(),
                arguments: r#"{"query": "SELECT COUNT(*) FROM ExplorationProduction"}"#.into(),
            }],
        );
        history.add_tool_message("[(97)]", "call_0");
        history.add_assistant_message("There are 97 wells in Texas.");

        assert_eq!(history.len(), 4);
        let roles: Vec<_> = history.messages().iter().map(|m| m.role.clone()).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::Tool,
                MessageRole::Assistant
            ]
        );
    }

    #[test]
    fn test_tool_turn_carries_call_id() {
        let mut history = ChatHistory::new();
        history.add_tool_message("No Result Found", "call_3");

        let msg = &history.messages()[0];
        assert_eq!(msg.role, MessageRole::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_3"));
    }

    #[test]
    fn test_assistant_tool_calls_preserved() {
        let call = ToolInvocation {
            id: "call_1".into(),
            name: "query".into(),
            arguments: "{}".into(),
        };
        let msg = ConversationMessage::assistant_tool_calls("thinking", vec![call.clone()]);
        assert_eq!(msg.tool_calls, vec![call]);
    }

    #[test]
    fn test_role_strings() {
        assert_eq!(MessageRole::System.as_str(), "system");
        assert_eq!(MessageRole::Tool.as_str(), "tool");
    }
}
