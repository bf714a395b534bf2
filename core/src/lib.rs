pub mod agent;
pub mod config;
pub mod error;
pub mod providers;
pub mod tools;
pub mod traits;

pub use agent::{AgentLoop, ToolServer, calculator_server};
pub use config::*;
pub use error::ProviderError;
pub use providers::*;
pub use tools::*;
pub use traits::*;
