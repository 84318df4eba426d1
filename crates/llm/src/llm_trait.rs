use async_trait::async_trait;
use listingsmith_common::Result;

/// Common trait for text-completion clients
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one system + user prompt pair and return the model's text
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}
