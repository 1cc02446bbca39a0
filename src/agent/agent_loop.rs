//! The Agent Loop
//!
//! One chat turn: call the model with tool definitions, execute any
//! returned tool calls, feed the results back, and repeat until the
//! model answers in plain text.

use anyhow::Result;
use tracing::info;

use crate::types::{
    ChatMessage, ChatRole, InferenceClient, InferenceOptions, TokenUsage, ToolCallRecord,
};

use super::context::build_context_messages;
use super::system_prompt::build_system_prompt;
use super::tools::{create_builtin_tools, execute_tool, tools_to_inference_format};

/// Maximum number of model/tool rounds in a single turn. A model that
/// keeps requesting tools past this is cut off with its last text.
const MAX_TOOL_ROUNDS: usize = 10;

/// Outcome of one completed chat turn.
pub struct TurnOutcome {
    /// The agent's final text reply. May be empty if the model returned
    /// no content.
    pub reply: String,
    /// Every tool call executed during the turn, in order.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Token usage aggregated across all rounds of the turn.
    pub usage: TokenUsage,
    /// Number of inference calls made.
    pub rounds: usize,
}

/// Run one chat turn against the model.
///
/// `recent` is the recalled history (oldest first) replayed as context.
/// Tool failures are fed back to the model as tool results; only
/// transport or API failures surface as errors.
pub async fn run_turn(
    inference: &dyn InferenceClient,
    recent: &[crate::types::ConversationEntry],
    user_input: &str,
) -> Result<TurnOutcome> {
    let tools = create_builtin_tools();
    let tool_defs = tools_to_inference_format(&tools);

    let system_prompt = build_system_prompt();
    let mut messages = build_context_messages(&system_prompt, recent, user_input);

    let mut executed: Vec<ToolCallRecord> = Vec::new();
    let mut usage = TokenUsage::default();
    let mut reply = String::new();
    let mut rounds = 0;

    while rounds < MAX_TOOL_ROUNDS {
        rounds += 1;

        let options = InferenceOptions {
            tools: Some(tool_defs.clone()),
            ..Default::default()
        };

        let response = inference.chat(messages.clone(), Some(options)).await?;
        usage.accumulate(&response.usage);
        reply = response.message.content.clone();

        let tool_calls = response.tool_calls.as_deref().unwrap_or(&[]);
        if tool_calls.is_empty() {
            return Ok(TurnOutcome {
                reply,
                tool_calls: executed,
                usage,
                rounds,
            });
        }

        // Replay the assistant message that requested the calls, then one
        // tool message per result, and go another round.
        messages.push(response.message.clone());

        for tc in tool_calls {
            let args: serde_json::Value =
                serde_json::from_str(&tc.function.arguments).unwrap_or_default();

            info!(
                "[TOOL] {}({})",
                tc.function.name,
                preview(&serde_json::to_string(&args).unwrap_or_default(), 100)
            );

            let mut record = execute_tool(&tc.function.name, &args, &tools);
            // Match the model's call id so the follow-up round lines up.
            record.id = tc.id.clone();

            let result_content = if let Some(ref err) = record.error {
                format!("Error: {}", err)
            } else {
                record.result.clone()
            };

            info!(
                "[TOOL RESULT] {}: {}",
                tc.function.name,
                preview(&result_content, 200)
            );

            messages.push(ChatMessage {
                role: ChatRole::Tool,
                content: result_content,
                name: Some(tc.function.name.clone()),
                tool_calls: None,
                tool_call_id: Some(tc.id.clone()),
            });

            executed.push(record);
        }
    }

    info!("[TOOLS] Max tool rounds reached ({})", MAX_TOOL_ROUNDS);

    Ok(TurnOutcome {
        reply,
        tool_calls: executed,
        usage,
        rounds,
    })
}

/// Truncate a string for log output, respecting char boundaries.
fn preview(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::types::{
        InferenceResponse, InferenceToolCall, InferenceToolCallFunction,
    };

    /// Inference stub fed a script of canned responses.
    struct ScriptedInference {
        responses: Mutex<VecDeque<InferenceResponse>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedInference {
        fn new(responses: Vec<InferenceResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InferenceClient for ScriptedInference {
        async fn chat(
            &self,
            messages: Vec<ChatMessage>,
            _options: Option<InferenceOptions>,
        ) -> Result<InferenceResponse> {
            self.seen.lock().unwrap().push(messages);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        }
    }

    fn text_response(content: &str) -> InferenceResponse {
        InferenceResponse {
            id: "resp".to_string(),
            model: "gpt-4o".to_string(),
            message: ChatMessage {
                role: ChatRole::Assistant,
                content: content.to_string(),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
            tool_calls: None,
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            finish_reason: "stop".to_string(),
        }
    }

    fn tool_response(name: &str, arguments: &str, call_id: &str) -> InferenceResponse {
        let call = InferenceToolCall {
            id: call_id.to_string(),
            call_type: "function".to_string(),
            function: InferenceToolCallFunction {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        };
        InferenceResponse {
            id: "resp".to_string(),
            model: "gpt-4o".to_string(),
            message: ChatMessage {
                role: ChatRole::Assistant,
                content: String::new(),
                name: None,
                tool_calls: Some(vec![call.clone()]),
                tool_call_id: None,
            },
            tool_calls: Some(vec![call]),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            finish_reason: "tool_calls".to_string(),
        }
    }

    #[tokio::test]
    async fn test_plain_text_turn() {
        let inference = ScriptedInference::new(vec![text_response("Hello there")]);
        let outcome = run_turn(&inference, &[], "hi").await.unwrap();

        assert_eq!(outcome.reply, "Hello there");
        assert!(outcome.tool_calls.is_empty());
        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.usage.total_tokens, 15);
    }

    #[tokio::test]
    async fn test_tool_round_then_answer() {
        let inference = ScriptedInference::new(vec![
            tool_response("add", r#"{"a":3,"b":5}"#, "call_1"),
            text_response("3 + 5 = 8"),
        ]);
        let outcome = run_turn(&inference, &[], "what is 3+5").await.unwrap();

        assert_eq!(outcome.reply, "3 + 5 = 8");
        assert_eq!(outcome.rounds, 2);
        assert_eq!(outcome.tool_calls.len(), 1);
        assert_eq!(outcome.tool_calls[0].id, "call_1");
        assert_eq!(outcome.tool_calls[0].result, "8");
        assert_eq!(outcome.usage.total_tokens, 30);

        // Second call must carry the tool result back to the model.
        let seen = inference.seen.lock().unwrap();
        let followup = &seen[1];
        let tool_msg = followup
            .iter()
            .find(|m| m.role == ChatRole::Tool)
            .expect("tool message in follow-up round");
        assert_eq!(tool_msg.content, "8");
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn test_tool_error_is_fed_back() {
        let inference = ScriptedInference::new(vec![
            tool_response("add", r#"{"a":3}"#, "call_1"),
            text_response("I could not compute that."),
        ]);
        let outcome = run_turn(&inference, &[], "add something").await.unwrap();

        assert!(outcome.tool_calls[0].error.is_some());

        let seen = inference.seen.lock().unwrap();
        let tool_msg = seen[1].iter().find(|m| m.role == ChatRole::Tool).unwrap();
        assert!(tool_msg.content.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_round_cap() {
        // A model that never stops asking for tools.
        let responses: Vec<InferenceResponse> = (0..20)
            .map(|i| tool_response("add", r#"{"a":1,"b":1}"#, &format!("call_{}", i)))
            .collect();
        let inference = ScriptedInference::new(responses);

        let outcome = run_turn(&inference, &[], "loop forever").await.unwrap();
        assert_eq!(outcome.rounds, 10);
        assert_eq!(outcome.tool_calls.len(), 10);
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("abcdefghij", 4), "abcd...");
    }
}
