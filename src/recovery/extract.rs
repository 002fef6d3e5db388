//! Best-effort JSON extraction from model output
//!
//! Strategies run in a fixed order and the first one that yields a parsed
//! document wins. Each returns `None` when it does not apply.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

/// A single extraction attempt
pub type Strategy = fn(&str) -> Option<Value>;

/// ```` ``` ```` fences with an optional `json` tag; the interior is captured lazily
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?i:json)?\s*(.*?)\s*```").expect("fenced block pattern is valid")
});

/// Strategies in priority order
pub const STRATEGIES: [(&str, Strategy); 3] = [
    ("direct", parse_direct),
    ("fenced", parse_fenced_block),
    ("bracket_scan", parse_bracket_span),
];

/// Run every strategy in order and return the first parsed document
pub fn extract_json(text: &str) -> Option<Value> {
    let extracted = STRATEGIES.iter().find_map(|(name, strategy)| {
        let value = strategy(text)?;
        debug!(strategy = *name, "Extracted JSON from model output");
        Some(value)
    });

    if extracted.is_none() {
        warn!("Could not extract valid JSON from model output");
    }
    extracted
}

/// The whole text is already a JSON document
pub fn parse_direct(text: &str) -> Option<Value> {
    serde_json::from_str(text.trim()).ok()
}

/// The first fenced block whose interior parses
pub fn parse_fenced_block(text: &str) -> Option<Value> {
    FENCED_BLOCK
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .find_map(|interior| serde_json::from_str(interior.as_str()).ok())
}

/// First `[` to last `]`, or else first `{` to last `}`
///
/// Only one span is tried: the array span whenever its brackets are ordered,
/// the object span otherwise.
pub fn parse_bracket_span(text: &str) -> Option<Value> {
    let span = ordered_span(text, '[', ']').or_else(|| ordered_span(text, '{', '}'))?;
    serde_json::from_str(span).ok()
}

fn ordered_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_direct_parse_accepts_clean_json() {
        let value = parse_direct("  [{\"a\": 1}]\n").unwrap();
        assert_eq!(value, json!([{"a": 1}]));
    }

    #[test]
    fn test_direct_parse_rejects_prose() {
        assert!(parse_direct("Sure! [1, 2]").is_none());
    }

    #[rstest]
    #[case("```json\n[1, 2, 3]\n```")]
    #[case("Here:\n```JSON\n[1, 2, 3]\n```\nEnjoy")]
    #[case("```\n[1, 2, 3]\n```")]
    #[case("```json [1, 2, 3]```")]
    fn test_fenced_block(#[case] text: &str) {
        assert_eq!(parse_fenced_block(text), Some(json!([1, 2, 3])));
    }

    #[test]
    fn test_fenced_block_skips_unparseable_blocks() {
        let text = "```python\nprint(1)\n```\nand\n```json\n{\"ok\": true}\n```";
        assert_eq!(parse_fenced_block(text), Some(json!({"ok": true})));
    }

    #[test]
    fn test_bracket_scan_recovers_embedded_array() {
        let text = r#"Here you go: [ {"x": 1}, {"x": 2} ] Thanks!"#;
        assert_eq!(
            parse_bracket_span(text),
            Some(json!([{"x": 1}, {"x": 2}]))
        );
    }

    #[test]
    fn test_bracket_scan_falls_back_to_object_span() {
        let text = r#"Result: {"destination": "Coorg"} done"#;
        assert_eq!(
            parse_bracket_span(text),
            Some(json!({"destination": "Coorg"}))
        );
    }

    #[test]
    fn test_bracket_scan_uses_object_when_brackets_are_reversed() {
        let text = r#"] {"a": 1} ["#;
        assert_eq!(parse_bracket_span(text), Some(json!({"a": 1})));
    }

    #[test]
    fn test_bracket_scan_does_not_retry_object_after_bad_array() {
        assert!(parse_bracket_span(r#"[oops {"a": 1} ]"#).is_none());
    }

    #[test]
    fn test_extract_json_order() {
        // Direct parse wins over the fenced interior for clean input.
        assert_eq!(extract_json("[1]"), Some(json!([1])));
        assert_eq!(extract_json("```json\n[2]\n```"), Some(json!([2])));
        assert_eq!(extract_json("list: [3] end"), Some(json!([3])));
    }

    #[test]
    fn test_extract_json_gives_up() {
        assert!(extract_json("I cannot help with that.").is_none());
        assert!(extract_json("").is_none());
    }
}
