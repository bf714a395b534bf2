use crate::error::ProviderError;
use crate::traits::{ChatMessage, ChatRequest, ChatResponse, Provider, ToolCall, ToolSpec, Usage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "OpenAI";

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool<'a>>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAIMessage<'a> {
    role: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCallRequest<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct OpenAIToolCallRequest<'a> {
    id: &'a str,
    r#type: &'a str,
    function: OpenAIFunctionRequest<'a>,
}

#[derive(Debug, Serialize)]
struct OpenAIFunctionRequest<'a> {
    name: &'a str,
    arguments: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAITool<'a> {
    r#type: &'a str,
    function: OpenAIToolFunction<'a>,
}

#[derive(Debug, Serialize)]
struct OpenAIToolFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIChoice {
    pub message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIResponseMessage {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIToolCall {
    id: String,
    function: OpenAIFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    /// Only populated by gateways that do their own accounting.
    #[serde(default)]
    cost: Option<f64>,
}

impl From<OpenAIUsage> for Usage {
    fn from(usage: OpenAIUsage) -> Self {
        Usage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            cost_usd: usage.cost,
        }
    }
}

pub(crate) fn convert_messages(messages: &[ChatMessage]) -> Vec<OpenAIMessage<'_>> {
    messages
        .iter()
        .map(|m| {
            let tool_calls = m.tool_calls.as_ref().map(|tool_calls| {
                tool_calls
                    .iter()
                    .map(|tc| OpenAIToolCallRequest {
                        id: &tc.id,
                        r#type: "function",
                        function: OpenAIFunctionRequest {
                            name: &tc.name,
                            arguments: &tc.arguments,
                        },
                    })
                    .collect()
            });

            OpenAIMessage {
                role: &m.role,
                content: Some(m.content.as_str()),
                tool_calls,
                tool_call_id: m.tool_call_id.as_deref(),
            }
        })
        .collect()
}

pub(crate) fn convert_tools(tools: &[ToolSpec]) -> Vec<OpenAITool<'_>> {
    tools
        .iter()
        .map(|t| OpenAITool {
            r#type: "function",
            function: OpenAIToolFunction {
                name: &t.name,
                description: &t.description,
                parameters: &t.parameters_schema,
            },
        })
        .collect()
}

/// Turns a decoded completion into a [`ChatResponse`], rejecting replies
/// that carry neither text nor tool calls.
pub(crate) fn into_chat_response(
    provider: &'static str,
    response: OpenAIResponse,
) -> anyhow::Result<ChatResponse> {
    let usage = response.usage.map(Usage::from);
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| anyhow::anyhow!("No choices in {} response", provider))?;

    let tool_calls: Vec<ToolCall> = message
        .tool_calls
        .map(|calls| {
            calls
                .into_iter()
                .map(|c| ToolCall {
                    id: c.id,
                    name: c.function.name,
                    arguments: c.function.arguments,
                })
                .collect()
        })
        .unwrap_or_default();

    let has_content = message
        .content
        .as_ref()
        .is_some_and(|c| !c.trim().is_empty());
    if !has_content && tool_calls.is_empty() {
        return Err(ProviderError::EmptyResponse(provider).into());
    }

    Ok(ChatResponse {
        text: message.content,
        tool_calls,
        usage,
    })
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .connect_timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_default()
}

pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let openai_request = OpenAIRequest {
            model: &self.model,
            messages: convert_messages(request.messages),
            tools: request.tools.map(convert_tools),
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(PROVIDER, status, error_text).into());
        }

        let openai_response: OpenAIResponse = response.json().await?;
        into_chat_response(PROVIDER, openai_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_call_response_is_decoded() {
        let raw = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "mcp__calculator__add",
                            "arguments": "{\"a\":5,\"b\":3}"
                        }
                    }]
                }
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 18, "total_tokens": 138}
        });
        let response: OpenAIResponse = serde_json::from_value(raw).unwrap();
        let response = into_chat_response(PROVIDER, response).unwrap();

        assert!(response.has_tool_calls());
        assert_eq!(response.tool_calls[0].name, "mcp__calculator__add");
        assert_eq!(response.tool_calls[0].arguments, "{\"a\":5,\"b\":3}");
        let usage = response.usage.unwrap();
        assert_eq!(usage.input_tokens, 120);
        assert_eq!(usage.output_tokens, 18);
        assert_eq!(usage.cost_usd, None);
    }

    #[test]
    fn blank_response_is_rejected() {
        let raw = json!({"choices": [{"message": {"content": "  "}}]});
        let response: OpenAIResponse = serde_json::from_value(raw).unwrap();
        let err = into_chat_response(PROVIDER, response).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::EmptyResponse(_))
        ));
    }

    #[test]
    fn request_serializes_tools_and_history() {
        let messages = vec![
            ChatMessage::system("sys"),
            ChatMessage::assistant_with_tool_calls(
                "",
                vec![ToolCall {
                    id: "call_1".into(),
                    name: "mcp__calculator__add".into(),
                    arguments: "{}".into(),
                }],
            ),
            ChatMessage::tool_result("call_1".into(), "done"),
        ];
        let tools = vec![ToolSpec {
            name: "mcp__calculator__add".into(),
            description: "Add two numbers.".into(),
            parameters_schema: json!({"type": "object"}),
        }];
        let request = OpenAIRequest {
            model: "gpt-4o-mini",
            messages: convert_messages(&messages),
            tools: Some(convert_tools(&tools)),
            temperature: 0.0,
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["tools"][0]["type"], "function");
        assert_eq!(value["tools"][0]["function"]["name"], "mcp__calculator__add");
        assert_eq!(value["messages"][1]["tool_calls"][0]["type"], "function");
        assert_eq!(value["messages"][2]["tool_call_id"], "call_1");
        assert!(value["messages"][0].get("tool_calls").is_none());
    }
}
