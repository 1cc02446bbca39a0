//! System Prompt
//!
//! Builds the system message that frames every inference call.

/// Build the agent's system prompt.
pub fn build_system_prompt() -> String {
    [
        "You are my personal AI agent with memory.",
        "1. Answer accurately",
        "2. Use previous context",
        "3. Use tools when required",
        "4. Stay conversational",
    ]
    .join("\n")
}
