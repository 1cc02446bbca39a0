//! Azure OpenAI Inference Client
//!
//! Wraps an Azure OpenAI chat-completions deployment (OpenAI-compatible
//! wire format, `api-key` header, `api-version` query parameter).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::AgentConfig;
use crate::types::{
    ChatMessage, ChatRole, InferenceClient, InferenceOptions, InferenceResponse,
    InferenceToolCall, InferenceToolCallFunction, TokenUsage,
};

/// Inference client for Azure OpenAI chat completions.
pub struct AzureClient {
    endpoint: String,
    api_version: String,
    deployment: String,
    api_key: String,
    max_tokens: u32,
    http: Client,
}

impl AzureClient {
    /// Create a client from the agent configuration.
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            endpoint: config.azure_endpoint.clone(),
            api_version: config.azure_version.clone(),
            deployment: config.azure_deployment.clone(),
            api_key: config.azure_key.clone(),
            max_tokens: config.max_tokens,
            http: Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

#[async_trait]
impl InferenceClient for AzureClient {
    /// Send a chat completion request and return the inference response.
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        options: Option<InferenceOptions>,
    ) -> Result<InferenceResponse> {
        let token_limit = options
            .as_ref()
            .and_then(|o| o.max_tokens)
            .unwrap_or(self.max_tokens);

        // Deterministic answers unless the caller overrides.
        let temperature = options
            .as_ref()
            .and_then(|o| o.temperature)
            .unwrap_or(0.0);

        let formatted_messages: Vec<Value> = messages.iter().map(format_message).collect();

        let mut body = serde_json::json!({
            "messages": formatted_messages,
            "max_tokens": token_limit,
            "temperature": temperature,
        });

        if let Some(tool_defs) = options.as_ref().and_then(|o| o.tools.as_ref()) {
            if !tool_defs.is_empty() {
                body["tools"] = serde_json::json!(tool_defs);
                body["tool_choice"] = serde_json::json!("auto");
            }
        }

        let resp = self
            .http
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Inference request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Inference error: {}: {}", status.as_u16(), text);
        }

        let data: Value = resp
            .json()
            .await
            .context("Failed to parse inference response")?;

        let choice = data["choices"]
            .get(0)
            .ok_or_else(|| anyhow::anyhow!("No completion choice returned from inference"))?;

        let message = &choice["message"];

        let usage = TokenUsage {
            prompt_tokens: data["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
            completion_tokens: data["usage"]["completion_tokens"].as_u64().unwrap_or(0),
            total_tokens: data["usage"]["total_tokens"].as_u64().unwrap_or(0),
        };

        let tool_calls: Option<Vec<InferenceToolCall>> = message["tool_calls"]
            .as_array()
            .map(|tcs| {
                tcs.iter()
                    .map(|tc| InferenceToolCall {
                        id: tc["id"].as_str().unwrap_or("").to_string(),
                        call_type: "function".to_string(),
                        function: InferenceToolCallFunction {
                            name: tc["function"]["name"].as_str().unwrap_or("").to_string(),
                            arguments: tc["function"]["arguments"]
                                .as_str()
                                .unwrap_or("{}")
                                .to_string(),
                        },
                    })
                    .collect()
            });

        let role = match message["role"].as_str().unwrap_or("assistant") {
            "system" => ChatRole::System,
            "user" => ChatRole::User,
            "tool" => ChatRole::Tool,
            _ => ChatRole::Assistant,
        };

        let response_message = ChatMessage {
            role,
            content: message["content"].as_str().unwrap_or("").to_string(),
            name: message["name"].as_str().map(|s| s.to_string()),
            tool_calls: tool_calls.clone(),
            tool_call_id: message["tool_call_id"].as_str().map(|s| s.to_string()),
        };

        Ok(InferenceResponse {
            id: data["id"].as_str().unwrap_or("").to_string(),
            model: data["model"]
                .as_str()
                .unwrap_or(&self.deployment)
                .to_string(),
            message: response_message,
            tool_calls,
            usage,
            finish_reason: choice["finish_reason"].as_str().unwrap_or("stop").to_string(),
        })
    }
}

/// Format a ChatMessage into the JSON structure expected by the API.
fn format_message(msg: &ChatMessage) -> Value {
    let mut formatted = serde_json::json!({
        "role": msg.role,
        "content": msg.content,
    });

    if let Some(ref name) = msg.name {
        formatted["name"] = serde_json::json!(name);
    }

    if let Some(ref tool_calls) = msg.tool_calls {
        let tc_json: Vec<Value> = tool_calls
            .iter()
            .map(|tc| {
                serde_json::json!({
                    "id": tc.id,
                    "type": tc.call_type,
                    "function": {
                        "name": tc.function.name,
                        "arguments": tc.function.arguments,
                    }
                })
            })
            .collect();
        formatted["tool_calls"] = serde_json::json!(tc_json);
    }

    if let Some(ref tool_call_id) = msg.tool_call_id {
        formatted["tool_call_id"] = serde_json::json!(tool_call_id);
    }

    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AgentConfig {
        AgentConfig {
            azure_endpoint: "https://myres.openai.azure.com".to_string(),
            azure_version: "2024-06-01".to_string(),
            azure_deployment: "gpt-4o".to_string(),
            azure_key: "key-test".to_string(),
            memory_path: "/tmp/memory.json".to_string(),
            max_tokens: 4096,
        }
    }

    #[test]
    fn test_completions_url() {
        let client = AzureClient::new(&test_config());
        assert_eq!(
            client.completions_url(),
            "https://myres.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-06-01"
        );
    }

    #[test]
    fn test_format_message_tool_result() {
        let msg = ChatMessage {
            role: ChatRole::Tool,
            content: "8".to_string(),
            name: None,
            tool_calls: None,
            tool_call_id: Some("call_1".to_string()),
        };
        let v = format_message(&msg);
        assert_eq!(v["role"], "tool");
        assert_eq!(v["content"], "8");
        assert_eq!(v["tool_call_id"], "call_1");
    }

    #[test]
    fn test_format_message_assistant_with_tool_calls() {
        let msg = ChatMessage {
            role: ChatRole::Assistant,
            content: String::new(),
            name: None,
            tool_calls: Some(vec![InferenceToolCall {
                id: "call_1".to_string(),
                call_type: "function".to_string(),
                function: InferenceToolCallFunction {
                    name: "add".to_string(),
                    arguments: r#"{"a":3,"b":5}"#.to_string(),
                },
            }]),
            tool_call_id: None,
        };
        let v = format_message(&msg);
        assert_eq!(v["tool_calls"][0]["function"]["name"], "add");
        assert_eq!(v["tool_calls"][0]["type"], "function");
    }
}
