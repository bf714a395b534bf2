use crate::error::ProviderError;
use crate::providers::openai::{
    OpenAIMessage, OpenAIResponse, OpenAITool, convert_messages, convert_tools, http_client,
    into_chat_response,
};
use crate::traits::{ChatRequest, ChatResponse, Provider};
use async_trait::async_trait;
use serde::Serialize;

const PROVIDER: &str = "OpenRouter";

#[derive(Debug, Serialize)]
struct OpenRouterRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool<'a>>>,
    temperature: f64,
    usage: UsageAccounting,
}

/// Asks OpenRouter to report the charged cost alongside token counts.
#[derive(Debug, Serialize)]
struct UsageAccounting {
    include: bool,
}

pub struct OpenRouterProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenRouterProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            api_key: api_key.into(),
            model: "openai/gpt-4o-mini".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
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
impl Provider for OpenRouterProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let openrouter_request = OpenRouterRequest {
            model: &self.model,
            messages: convert_messages(request.messages),
            tools: request.tools.map(convert_tools),
            temperature: request.temperature,
            usage: UsageAccounting { include: true },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-Title", "Abacus")
            .json(&openrouter_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(PROVIDER, status, error_text).into());
        }

        let openrouter_response: OpenAIResponse = response.json().await?;
        into_chat_response(PROVIDER, openrouter_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reported_cost_is_kept() {
        let raw = json!({
            "choices": [{"message": {"content": "5 + 3 = 8"}}],
            "usage": {"prompt_tokens": 200, "completion_tokens": 12, "cost": 0.000042}
        });
        let response: OpenAIResponse = serde_json::from_value(raw).unwrap();
        let response = into_chat_response(PROVIDER, response).unwrap();
        assert_eq!(response.text_or_empty(), "5 + 3 = 8");
        assert_eq!(response.usage.unwrap().cost_usd, Some(0.000042));
    }

    #[test]
    fn request_enables_usage_accounting() {
        let request = OpenRouterRequest {
            model: "openai/gpt-4o-mini",
            messages: vec![],
            tools: None,
            temperature: 0.0,
            usage: UsageAccounting { include: true },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["usage"], json!({"include": true}));
        assert!(value.get("tools").is_none());
    }
}
