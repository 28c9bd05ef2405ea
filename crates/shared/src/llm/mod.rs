pub mod anthropic;
pub mod gateway;
pub mod prompts;

pub use anthropic::{AnthropicGateway, AnthropicGatewayConfig, AnthropicGatewayError};
pub use gateway::{
    CompletionError, CompletionFuture, CompletionGateway, CompletionRequest, CompletionResponse,
};
pub use prompts::SCOPER_SYSTEM_PROMPT;
