//! Deterministic suggestions used when the model output cannot be recovered

use crate::models::Suggestion;

/// The three fixed fallback suggestions.
///
/// Costs and travel times of the second and third entries are derived from
/// the request with floor division; the first entry ignores the inputs.
#[must_use]
pub fn fallback_suggestions(budget: f64, distance: f64, currency_symbol: &str) -> Vec<Suggestion> {
    vec![
        Suggestion::new(
            "Local Park",
            "A peaceful park within your city with walking trails and picnic areas.",
            format!("{currency_symbol}500 approx"),
            "15-30 mins",
        ),
        Suggestion::new(
            "Nearby Town",
            "A charming town with local markets and cultural attractions.",
            format!("{currency_symbol}{} approx", floor_div(budget, 3.0)),
            format!("{} hours", floor_div(distance, 30.0)),
        ),
        Suggestion::new(
            "Nature Reserve",
            "Beautiful natural area with hiking trails and wildlife viewing opportunities.",
            format!("{currency_symbol}{} approx", floor_div(budget, 2.0)),
            format!("{} hours 30 mins", floor_div(distance, 40.0)),
        ),
    ]
}

/// Floor division rendered without a fractional part
fn floor_div(value: f64, divisor: f64) -> String {
    let whole = (value / divisor).floor();
    // -0 prints as "-0"
    if whole == 0.0 {
        "0".to_string()
    } else {
        whole.to_string()
    }
}
