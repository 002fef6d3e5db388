//! Data models for the CloseEscape service
//!
//! - Location: caller-supplied starting point and its resolved place
//! - Suggestion: requests, suggestions and suggestion batches

pub mod lenient;
pub mod location;
pub mod suggestion;

// Re-export all public types for convenient access
pub use location::{Location, Place};
pub use suggestion::{
    FALLBACK_NOTE, Suggestion, SuggestionBatch, SuggestionRequest, SuggestionSource,
};
