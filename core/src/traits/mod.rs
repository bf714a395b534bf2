pub mod provider;
pub mod runtime;
pub mod tool;

pub use provider::{ChatMessage, ChatRequest, ChatResponse, Provider, ToolCall, Usage};
pub use runtime::{AgentRuntime, ResponseEvent};
pub use tool::{ContentBlock, Tool, ToolResult, ToolSpec};
