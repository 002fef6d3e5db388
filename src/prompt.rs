//! Prompt construction for the suggestion model

use crate::models::SuggestionRequest;

/// Builds the instruction string sent to the model.
///
/// Inputs are interpolated as given; nothing here validates them.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    count: u32,
    currency_symbol: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(6, "₹")
    }
}

impl PromptBuilder {
    #[must_use]
    pub fn new(count: u32, currency_symbol: impl Into<String>) -> Self {
        Self {
            count,
            currency_symbol: currency_symbol.into(),
        }
    }

    /// Number of destinations the prompt asks for
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub fn build(&self, request: &SuggestionRequest) -> String {
        let currency = &self.currency_symbol;
        format!(
            r#"You are a travel recommendation system. Based on the following criteria:
- Budget: Around {currency}{budget}
- Distance: Within {distance} km of {place}

Suggest exactly {count} travel destinations.

IMPORTANT: Respond ONLY with a valid JSON array of objects with this exact structure:
[
  {{
    "destination": "Name of Place",
    "description": "Brief description of the place",
    "estimatedCost": "{currency}X,XXX approx",
    "travelTime": "X hours Y mins"
  }},
  ...
]

Do not include any text before or after the JSON array. No markdown formatting, no explanations."#,
            budget = request.budget,
            distance = request.distance,
            place = request.place.describe(),
            count = self.count,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Place;

    fn request(place: Place) -> SuggestionRequest {
        SuggestionRequest::new(10000.0, 15.0, place)
    }

    #[test]
    fn test_prompt_embeds_named_place() {
        let prompt = PromptBuilder::default().build(&request(Place::Named("Pune".to_string())));
        assert!(prompt.contains("You are a travel recommendation system"));
        assert!(prompt.contains("Budget: Around ₹10000"));
        assert!(prompt.contains("Within 15 km of Pune"));
        assert!(prompt.contains("Suggest exactly 6 travel destinations."));
    }

    #[test]
    fn test_prompt_embeds_coordinates() {
        let prompt = PromptBuilder::default().build(&request(Place::Coordinates {
            latitude: 18.5204,
            longitude: 73.8567,
        }));
        assert!(prompt.contains("Within 15 km of coordinates (18.5204, 73.8567)"));
    }

    #[test]
    fn test_prompt_describes_exact_shape() {
        let prompt = PromptBuilder::default().build(&request(Place::Named("Goa".to_string())));
        for key in ["destination", "description", "estimatedCost", "travelTime"] {
            assert!(prompt.contains(&format!("\"{key}\"")), "missing key {key}");
        }
        assert!(prompt.contains("Do not include any text before or after the JSON array"));
        assert!(prompt.contains("No markdown formatting"));
    }

    #[test]
    fn test_prompt_passes_odd_inputs_through() {
        let prompt = PromptBuilder::new(3, "$").build(&SuggestionRequest::new(
            -250.5,
            0.0,
            Place::Named("Nowhere".to_string()),
        ));
        assert!(prompt.contains("Budget: Around $-250.5"));
        assert!(prompt.contains("Within 0 km of Nowhere"));
        assert!(prompt.contains("Suggest exactly 3 travel destinations."));
    }
}
