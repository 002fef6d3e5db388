//! `CloseEscape` - nearby getaway suggestions
//!
//! This library builds a travel-recommendation prompt from a budget, a
//! distance and a location, forwards it to a generative model, and recovers a
//! structured list of suggestions from the model's free-form reply.

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod location_resolver;
pub mod models;
pub mod prompt;
pub mod recovery;
pub mod service;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::CloseEscapeConfig;
pub use error::{CloseEscapeError, UpstreamErrorKind};
pub use llm::{CompletionModel, GeminiClient};
pub use location_resolver::LocationResolver;
pub use models::{Location, Place, Suggestion, SuggestionBatch, SuggestionRequest};
pub use prompt::PromptBuilder;
pub use recovery::ResponseRecoverer;
pub use service::SuggestionService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, CloseEscapeError>;
