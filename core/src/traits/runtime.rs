use crate::traits::Usage;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// One unit of an agent reply, yielded in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseEvent {
    AssistantText {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Map<String, serde_json::Value>,
    },
    System {
        subtype: String,
        data: serde_json::Value,
    },
    Result {
        session_id: String,
        num_turns: usize,
        duration_ms: u64,
        usage: Usage,
        total_cost_usd: Option<f64>,
        is_error: bool,
    },
}

impl ResponseEvent {
    /// The summary event closes a turn; everything else means more is coming.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Result { .. })
    }
}

/// A conversational backend that can invoke registered tools mid-reply.
///
/// Implementations keep conversation state between queries, so one value
/// represents one session.
pub trait AgentRuntime: Send {
    /// Submit user text and receive the reply as an ordered event stream.
    ///
    /// The stream ends after the final `Result` event or the first error.
    fn query<'a>(&'a mut self, prompt: &'a str) -> BoxStream<'a, anyhow::Result<ResponseEvent>>;
}
