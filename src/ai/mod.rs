pub mod context;
pub mod gemini;
pub mod prompt_template;

use async_trait::async_trait;

/// Text generation backend used by the client.
///
/// Implementations never fail: network and HTTP problems come back as a
/// descriptive string so the caller always has something to print and to
/// fold into the conversation.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Provider name (e.g., "gemini")
    fn name(&self) -> &str;

    /// Generate a response for a fully assembled prompt
    async fn generate(&self, full_prompt: &str, thinking_budget: u32) -> String;
}
