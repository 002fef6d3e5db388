//! Response recovery
//!
//! Turns raw model text into a validated suggestion batch. Recovery never
//! fails: when nothing usable can be extracted, the fixed fallback
//! suggestions are returned instead and the batch is flagged accordingly.

pub mod extract;
pub mod fallback;
pub mod validate;

pub use extract::extract_json;
pub use fallback::fallback_suggestions;
pub use validate::valid_suggestions;

use tracing::{info, warn};

use crate::models::{SuggestionBatch, SuggestionRequest};

/// Extract, validate, and if needed synthesize suggestions
#[derive(Debug, Clone)]
pub struct ResponseRecoverer {
    currency_symbol: String,
}

impl Default for ResponseRecoverer {
    fn default() -> Self {
        Self::new("₹")
    }
}

impl ResponseRecoverer {
    #[must_use]
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
        }
    }

    /// Recover a batch from model output.
    ///
    /// A partially valid array returns its valid subset. Only zero surviving
    /// items, or no extractable document at all, triggers the fallback.
    #[must_use]
    pub fn recover(&self, text: &str, request: &SuggestionRequest) -> SuggestionBatch {
        let suggestions = extract_json(text)
            .map(|value| valid_suggestions(&value))
            .unwrap_or_default();

        if suggestions.is_empty() {
            warn!("Using fallback suggestions due to invalid AI response");
            return SuggestionBatch::fallback(fallback_suggestions(
                request.budget,
                request.distance,
                &self.currency_symbol,
            ));
        }

        info!("Recovered {} suggestions from model output", suggestions.len());
        SuggestionBatch::from_model(suggestions)
    }
}
