pub mod loop_;
pub mod prompt;
pub mod registry;

pub use loop_::AgentLoop;
pub use prompt::build_system_prompt;
pub use registry::{ToolServer, calculator_server};
