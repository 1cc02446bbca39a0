//! The agent: reasoning loop, tools, prompt, and context assembly.

pub mod agent_loop;
pub mod context;
pub mod system_prompt;
pub mod tools;
