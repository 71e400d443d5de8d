//! Response Normalizer: recovers the JSON object from model text that may
//! carry leading acknowledgements, trailing prose or code fences.
//!
//! Two tiers, each tried only if the previous one fails:
//! 1. parse the whole text as JSON;
//! 2. parse the span from the first `{` to the last `}`.
//!
//! Broken JSON is not repaired.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("no JSON object found in model output")]
    NoJsonObject,

    #[error("extracted JSON candidate did not parse: {0}")]
    InvalidJson(String),
}

pub fn normalize(text: &str) -> Result<Value, NormalizeError> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    let candidate = outermost_braces(text).ok_or(NormalizeError::NoJsonObject)?;

    serde_json::from_str(candidate).map_err(|e| NormalizeError::InvalidJson(e.to_string()))
}

/// Greedy span from the first `{` through the last `}`.
fn outermost_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_clean_json_is_returned_unchanged() {
        let original = json!({
            "script": "Hook.\nBody.",
            "word_count": 152,
            "score": { "hook_strength": 7, "total_normalized": 61.5 },
            "badges": ["quotable"]
        });
        let text = serde_json::to_string_pretty(&original).unwrap();
        assert_eq!(normalize(&text).unwrap(), original);
    }

    #[test]
    fn test_fenced_json_with_preamble() {
        let text = "Here you go:\n```json\n{\"script\": \"hi\", \"word_count\": 1}\n```";
        assert_eq!(
            normalize(text).unwrap(),
            json!({ "script": "hi", "word_count": 1 })
        );
    }

    #[test]
    fn test_trailing_prose_is_ignored() {
        let text = "{\"a\": {\"b\": [1, 2]}}\n\nLet me know if you want another take!";
        assert_eq!(normalize(text).unwrap(), json!({ "a": { "b": [1, 2] } }));
    }

    #[test]
    fn test_braces_inside_strings_survive() {
        let text = "Sure! {\"script\": \"use {curly} braces\"} done";
        assert_eq!(
            normalize(text).unwrap(),
            json!({ "script": "use {curly} braces" })
        );
    }

    #[test]
    fn test_no_braces_reports_failure() {
        assert_eq!(
            normalize("I can't help with that."),
            Err(NormalizeError::NoJsonObject)
        );
    }

    #[test]
    fn test_reversed_braces_report_failure() {
        assert_eq!(
            normalize("} nothing here {"),
            Err(NormalizeError::NoJsonObject)
        );
    }

    #[test]
    fn test_broken_json_is_not_repaired() {
        let result = normalize("Result: {\"script\": \"unterminated, \"word_count\": }");
        assert!(matches!(result, Err(NormalizeError::InvalidJson(_))));
    }

    #[test]
    fn test_two_objects_span_greedily_and_fail() {
        let result = normalize("first {\"a\": 1} then {\"b\": 2}");
        assert!(matches!(result, Err(NormalizeError::InvalidJson(_))));
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(normalize(""), Err(NormalizeError::NoJsonObject));
    }
}
