//! Suggestion request and result models

use serde::{Deserialize, Serialize};

use super::location::{Location, Place};

/// Note attached to every synthesized batch
pub const FALLBACK_NOTE: &str =
    "These are fallback suggestions as the AI response format was invalid.";

/// One request for trip suggestions. Built per call, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionRequest {
    /// Budget in currency units
    pub budget: f64,
    /// Maximum distance in kilometers
    pub distance: f64,
    /// Starting point
    pub place: Place,
}

impl SuggestionRequest {
    #[must_use]
    pub fn new(budget: f64, distance: f64, place: Place) -> Self {
        Self {
            budget,
            distance,
            place,
        }
    }

    /// Build a request from a caller-supplied location
    #[must_use]
    pub fn from_location(budget: f64, distance: f64, location: &Location) -> Self {
        Self::new(budget, distance, location.place())
    }
}

/// One recommended destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub destination: String,
    pub description: String,
    /// Human-readable, currency-prefixed cost, e.g. `₹3,000 approx`
    pub estimated_cost: String,
    /// Human-readable duration, e.g. `2 hours 30 mins`
    pub travel_time: String,
}

impl Suggestion {
    pub fn new(
        destination: impl Into<String>,
        description: impl Into<String>,
        estimated_cost: impl Into<String>,
        travel_time: impl Into<String>,
    ) -> Self {
        Self {
            destination: destination.into(),
            description: description.into(),
            estimated_cost: estimated_cost.into(),
            travel_time: travel_time.into(),
        }
    }
}

/// Where a batch came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    Model,
    Fallback,
}

/// Ordered suggestions plus their origin
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionBatch {
    pub suggestions: Vec<Suggestion>,
    pub source: SuggestionSource,
}

impl SuggestionBatch {
    #[must_use]
    pub fn from_model(suggestions: Vec<Suggestion>) -> Self {
        Self {
            suggestions,
            source: SuggestionSource::Model,
        }
    }

    #[must_use]
    pub fn fallback(suggestions: Vec<Suggestion>) -> Self {
        Self {
            suggestions,
            source: SuggestionSource::Fallback,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == SuggestionSource::Fallback
    }

    /// The note callers get alongside synthesized suggestions
    #[must_use]
    pub fn note(&self) -> Option<&'static str> {
        self.is_fallback().then_some(FALLBACK_NOTE)
    }
}
