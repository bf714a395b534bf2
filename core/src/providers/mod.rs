pub mod factory;
pub mod openai;
pub mod openrouter;

pub use factory::create_provider;
pub use openai::OpenAIProvider;
pub use openrouter::OpenRouterProvider;
