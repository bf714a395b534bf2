use crate::agent::{ToolServer, build_system_prompt};
use crate::config::Pricing;
use crate::traits::{
    AgentRuntime, ChatMessage, ChatRequest, Provider, ResponseEvent, ToolCall, Usage,
};
use futures_util::stream::BoxStream;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

const DEFAULT_MAX_ITERATIONS: usize = 8;

/// Provider-backed [`AgentRuntime`].
///
/// Each query runs the model, executes any tool calls it asks for through the
/// [`ToolServer`], and feeds the results back until the model answers without
/// calling a tool. Conversation history lives here and carries over between
/// queries.
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    server: Arc<ToolServer>,
    messages: Vec<ChatMessage>,
    session_id: String,
    max_iterations: usize,
    temperature: f64,
    pricing: Option<Pricing>,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn Provider>, server: Arc<ToolServer>) -> Self {
        let system_prompt = build_system_prompt(&server);
        Self {
            provider,
            server,
            messages: vec![ChatMessage::system(system_prompt)],
            session_id: uuid::Uuid::new_v4().to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            temperature: 0.0,
            pricing: None,
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_pricing(mut self, pricing: Option<Pricing>) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// System prompt followed by every completed exchange.
    pub fn history(&self) -> &[ChatMessage] {
        &self.messages
    }

    fn init_event(&self) -> ResponseEvent {
        ResponseEvent::System {
            subtype: "init".to_string(),
            data: json!({
                "session_id": self.session_id,
                "model": self.provider.model(),
                "server": {
                    "name": self.server.name(),
                    "version": self.server.version(),
                },
                "tools": self.server.allowed_tools(),
            }),
        }
    }

    fn total_cost(&self, usage: &Usage) -> Option<f64> {
        usage.cost_usd.or_else(|| {
            self.pricing
                .map(|p| p.cost(usage.input_tokens, usage.output_tokens))
        })
    }
}

/// Parses model-produced arguments. Anything that is not a JSON object
/// becomes an empty object, which the tools report as missing operands.
fn parse_arguments(call: &ToolCall) -> Map<String, Value> {
    match serde_json::from_str::<Value>(&call.arguments) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!("Tool {} got non-object arguments: {}", call.name, other);
            Map::new()
        }
        Err(e) => {
            warn!("Failed to parse arguments for {}: {}", call.name, e);
            Map::new()
        }
    }
}

impl AgentRuntime for AgentLoop {
    fn query<'a>(&'a mut self, prompt: &'a str) -> BoxStream<'a, anyhow::Result<ResponseEvent>> {
        Box::pin(async_stream::stream! {
            let started = Instant::now();
            let tools = self.server.specs();
            let mut usage = Usage::default();
            let mut num_turns = 0;
            let mut finished = false;

            yield Ok(self.init_event());

            // Turn messages are staged here and only replace the history once
            // the turn completes, so a dropped stream leaves history untouched.
            let mut messages = self.messages.clone();
            messages.push(ChatMessage::user(prompt));

            while num_turns < self.max_iterations {
                num_turns += 1;

                let request = ChatRequest {
                    messages: &messages,
                    tools: if tools.is_empty() { None } else { Some(tools.as_slice()) },
                    temperature: self.temperature,
                };
                let response = match self.provider.chat(request).await {
                    Ok(response) => response,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                if let Some(turn_usage) = &response.usage {
                    usage.accumulate(turn_usage);
                }

                let text = response.text_or_empty().trim().to_string();
                if !text.is_empty() {
                    yield Ok(ResponseEvent::AssistantText { text: text.clone() });
                }

                if !response.has_tool_calls() {
                    messages.push(ChatMessage::assistant(text));
                    finished = true;
                    break;
                }

                messages.push(ChatMessage::assistant_with_tool_calls(
                    text,
                    response.tool_calls.clone(),
                ));

                for call in response.tool_calls {
                    let input = parse_arguments(&call);
                    yield Ok(ResponseEvent::ToolUse {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        input: input.clone(),
                    });

                    let result = self.server.call(&call.name, &Value::Object(input)).await;
                    debug!("Tool {} returned {:?}", call.name, result);
                    messages.push(ChatMessage::tool_result(call.id, result.text()));
                }
            }

            if !finished {
                warn!("Stopped after {} model turns without a final answer", num_turns);
            }
            self.messages = messages;

            yield Ok(ResponseEvent::Result {
                session_id: self.session_id.clone(),
                num_turns,
                duration_ms: started.elapsed().as_millis() as u64,
                usage,
                total_cost_usd: self.total_cost(&usage),
                is_error: !finished,
            });
        })
    }
}
