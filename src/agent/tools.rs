//! Agent Tool System
//!
//! The arithmetic tools the model can call, their JSON-schema parameter
//! definitions, and the dispatch that executes them.

use std::time::Instant;

use anyhow::Result;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::types::{
    InferenceToolDefinition, InferenceToolDefinitionFunction, ToolCallRecord,
};

/// A built-in tool the model can invoke.
#[derive(Debug, Clone)]
pub struct BuiltinTool {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// JSON schema shared by all three arithmetic tools: two required integers.
fn two_int_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "a": { "type": "integer", "description": "First operand" },
            "b": { "type": "integer", "description": "Second operand" }
        },
        "required": ["a", "b"]
    })
}

/// Create all built-in tools available to the agent.
pub fn create_builtin_tools() -> Vec<BuiltinTool> {
    vec![
        BuiltinTool {
            name: "add".to_string(),
            description: "Add two numbers".to_string(),
            parameters: two_int_parameters(),
        },
        BuiltinTool {
            name: "subtract".to_string(),
            description: "Subtract two numbers".to_string(),
            parameters: two_int_parameters(),
        },
        BuiltinTool {
            name: "multiply".to_string(),
            description: "Multiply two numbers".to_string(),
            parameters: two_int_parameters(),
        },
    ]
}

/// Convert the `BuiltinTool` list to OpenAI-compatible tool definitions.
pub fn tools_to_inference_format(tools: &[BuiltinTool]) -> Vec<InferenceToolDefinition> {
    tools
        .iter()
        .map(|t| InferenceToolDefinition {
            def_type: "function".to_string(),
            function: InferenceToolDefinitionFunction {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            },
        })
        .collect()
}

/// Execute a tool call and return the result record.
///
/// Failures (unknown tool, bad arguments, overflow) land in the record's
/// `error` field so they can be surfaced back to the model; they are
/// never process errors.
pub fn execute_tool(tool_name: &str, args: &Value, tools: &[BuiltinTool]) -> ToolCallRecord {
    let start = Instant::now();

    if !tools.iter().any(|t| t.name == tool_name) {
        return ToolCallRecord {
            id: format!("tc_{}", Uuid::new_v4()),
            name: tool_name.to_string(),
            arguments: args.clone(),
            result: String::new(),
            duration_ms: 0,
            error: Some(format!("Unknown tool: {}", tool_name)),
        };
    }

    match execute_tool_inner(tool_name, args) {
        Ok(output) => ToolCallRecord {
            id: format!("tc_{}", Uuid::new_v4()),
            name: tool_name.to_string(),
            arguments: args.clone(),
            result: output,
            duration_ms: start.elapsed().as_millis() as u64,
            error: None,
        },
        Err(err) => ToolCallRecord {
            id: format!("tc_{}", Uuid::new_v4()),
            name: tool_name.to_string(),
            arguments: args.clone(),
            result: String::new(),
            duration_ms: start.elapsed().as_millis() as u64,
            error: Some(err.to_string()),
        },
    }
}

/// Internal tool execution dispatch.
fn execute_tool_inner(tool_name: &str, args: &Value) -> Result<String> {
    let a = require_int(args, "a")?;
    let b = require_int(args, "b")?;

    let result = match tool_name {
        "add" => a
            .checked_add(b)
            .ok_or_else(|| anyhow::anyhow!("Integer overflow in add"))?,
        "subtract" => a
            .checked_sub(b)
            .ok_or_else(|| anyhow::anyhow!("Integer overflow in subtract"))?,
        "multiply" => a
            .checked_mul(b)
            .ok_or_else(|| anyhow::anyhow!("Integer overflow in multiply"))?,
        _ => anyhow::bail!("Unknown tool: {}", tool_name),
    };

    Ok(result.to_string())
}

/// Extract a required integer argument.
fn require_int(args: &Value, key: &str) -> Result<i64> {
    args[key]
        .as_i64()
        .ok_or_else(|| anyhow::anyhow!("Missing or non-integer '{}' argument", key))
}
