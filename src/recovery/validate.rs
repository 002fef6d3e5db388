//! Field-contract validation for extracted suggestions

use serde_json::Value;
use tracing::debug;

use crate::models::Suggestion;

/// Keep the elements of a JSON array that satisfy the suggestion contract.
///
/// All four fields must be strings, and the destination and description must
/// not be blank. Anything else (including a non-array document) yields no
/// items. Survivors keep their relative order.
pub fn valid_suggestions(value: &Value) -> Vec<Suggestion> {
    let Some(items) = value.as_array() else {
        debug!("Extracted document is not an array");
        return Vec::new();
    };

    let suggestions: Vec<Suggestion> = items.iter().filter_map(to_suggestion).collect();

    if suggestions.len() != items.len() {
        debug!(
            "Dropped {} of {} candidate suggestions",
            items.len() - suggestions.len(),
            items.len()
        );
    }
    suggestions
}

fn to_suggestion(item: &Value) -> Option<Suggestion> {
    let suggestion: Suggestion = serde_json::from_value(item.clone()).ok()?;
    let complete = !suggestion.destination.trim().is_empty()
        && !suggestion.description.trim().is_empty();
    complete.then_some(suggestion)
}
