//! Text completion capability
//!
//! Recovery logic only needs `complete(prompt) -> text`, so the model sits
//! behind a trait and tests can feed canned responses without a network.

pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

/// A generative model that turns a prompt into free-form text.
///
/// Failures are reported as [`crate::CloseEscapeError::Upstream`] built from
/// the upstream message, which also carries its classification.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> crate::Result<String>;

    /// Name used in logs
    fn name(&self) -> &str;
}
