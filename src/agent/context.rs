//! Context Assembly
//!
//! Builds the message array for an inference call: system prompt,
//! recalled history, then the live user input.

use crate::types::{ChatMessage, ChatRole, ConversationEntry};

/// Build the message array for the next inference call.
///
/// Each recalled exchange is replayed as a user message plus a
/// `Previous response:` system message, so the model sees its own prior
/// answers as context without mistaking them for the live conversation.
pub fn build_context_messages(
    system_prompt: &str,
    recent: &[ConversationEntry],
    user_input: &str,
) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = Vec::new();

    messages.push(ChatMessage {
        role: ChatRole::System,
        content: system_prompt.to_string(),
        name: None,
        tool_calls: None,
        tool_call_id: None,
    });

    for entry in recent {
        messages.push(ChatMessage {
            role: ChatRole::User,
            content: entry.user.clone(),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        });
        messages.push(ChatMessage {
            role: ChatRole::System,
            content: format!("Previous response: {}", entry.agent),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        });
    }

    messages.push(ChatMessage {
        role: ChatRole::User,
        content: user_input.to_string(),
        name: None,
        tool_calls: None,
        tool_call_id: None,
    });

    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user: &str, agent: &str) -> ConversationEntry {
        ConversationEntry {
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            user: user.to_string(),
            agent: agent.to_string(),
        }
    }

    #[test]
    fn test_empty_history() {
        let messages = build_context_messages("be helpful", &[], "hello");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].role, ChatRole::User);
        assert_eq!(messages[1].content, "hello");
    }

    #[test]
    fn test_history_replayed_as_pairs() {
        let history = vec![entry("what is 2+2", "4"), entry("and doubled?", "8")];
        let messages = build_context_messages("be helpful", &history, "thanks");

        // system + 2 pairs + live input
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[1].content, "what is 2+2");
        assert_eq!(messages[2].role, ChatRole::System);
        assert_eq!(messages[2].content, "Previous response: 4");
        assert_eq!(messages[5].content, "thanks");
    }
}
