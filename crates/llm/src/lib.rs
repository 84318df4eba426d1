//! ListingSmith LLM Integration
//!
//! OpenRouter chat-completion client and response classification

mod client;
mod llm_trait;
mod normalize;
mod retry;
mod types;

pub use client::{classify_response, OpenRouterClient};
pub use llm_trait::CompletionClient;
pub use normalize::normalize_text;
pub use retry::{complete_with_retry, RetryPolicy};
pub use types::{ChatMessage, ChatRequest, ChatResponse, ErrorEnvelope, ProviderReply, Usage};
