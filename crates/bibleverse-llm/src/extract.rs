//! Verse extraction from free-form model output
//!
//! Models are asked for bare JSON but routinely wrap it in a markdown fence
//! or surround it with chatter. Extraction tries two stages and the first
//! success wins:
//!
//! 1. strip every ```` ```json ```` / ```` ``` ```` fence, trim, parse
//! 2. parse the greedy `{ ... }` span from the first `{` to the last `}`
//!
//! Both stages parse into [`VerseResult`] and require a non-empty
//! `reference` and `text`.

use std::sync::LazyLock;

use bibleverse_types::VerseResult;
use regex::Regex;
use thiserror::Error;

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\n?|\n?```").expect("invalid fence regex"));

static OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("invalid object regex"));

/// Why model output could not be turned into a verse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("No JSON object found in model output")]
    NoJsonObject,

    #[error("Model output is not valid verse JSON: {0}")]
    InvalidJson(String),

    #[error("Model output is missing '{0}'")]
    MissingField(&'static str),
}

/// Remove markdown code fences and surrounding whitespace
pub fn strip_code_fences(text: &str) -> String {
    FENCE_RE.replace_all(text, "").trim().to_string()
}

/// Greedy span from the first `{` to the last `}`
pub fn find_json_object(text: &str) -> Option<&str> {
    OBJECT_RE.find(text).map(|m| m.as_str())
}

/// Turn model output into a verse
pub fn extract_verse(text: &str) -> Result<VerseResult, ExtractionError> {
    let cleaned = strip_code_fences(text);
    if let Ok(verse) = parse_verse(&cleaned) {
        return Ok(verse);
    }

    match find_json_object(text) {
        Some(candidate) => parse_verse(candidate),
        None => Err(ExtractionError::NoJsonObject),
    }
}

fn parse_verse(candidate: &str) -> Result<VerseResult, ExtractionError> {
    let value: serde_json::Value = serde_json::from_str(candidate)
        .map_err(|e| ExtractionError::InvalidJson(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| ExtractionError::InvalidJson("expected a JSON object".to_string()))?;

    for field in ["reference", "text"] {
        if object.get(field).map_or(true, |v| v.is_null()) {
            return Err(ExtractionError::MissingField(field));
        }
    }

    let verse: VerseResult = serde_json::from_value(value)
        .map_err(|e| ExtractionError::InvalidJson(e.to_string()))?;

    match verse.missing_field() {
        Some(field) => Err(ExtractionError::MissingField(field)),
        None => Ok(verse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_json() {
        let text = "```json\n{\"reference\":\"A\",\"text\":\"B\"}\n```";
        let verse = extract_verse(text).unwrap();
        assert_eq!(verse, VerseResult::new("A", "B"));
    }

    #[test]
    fn test_json_surrounded_by_chatter() {
        let text = "Here is your verse: {\"reference\":\"A\",\"text\":\"B\"} Hope that helps!";
        let verse = extract_verse(text).unwrap();
        assert_eq!(verse, VerseResult::new("A", "B"));
    }

    #[test]
    fn test_bare_json_with_commentary() {
        let text = r#"  {
            "reference": "시편 23:1",
            "text": "여호와는 나의 목자시니 내가 부족함이 없으리로다",
            "context": "다윗의 시",
            "meaning": "하나님이 돌보신다",
            "prayer": "아멘"
        }  "#;
        let verse = extract_verse(text).unwrap();
        assert_eq!(verse.reference, "시편 23:1");
        assert_eq!(verse.prayer.as_deref(), Some("아멘"));
    }

    #[test]
    fn test_plain_fence_without_language() {
        let text = "```\n{\"reference\":\"A\",\"text\":\"B\"}\n```";
        assert_eq!(extract_verse(text).unwrap(), VerseResult::new("A", "B"));
    }

    #[test]
    fn test_nested_braces_use_greedy_span() {
        let text = "결과: {\"reference\":\"A\",\"text\":\"B\",\"extra\":{\"k\":1}} 끝";
        assert_eq!(extract_verse(text).unwrap(), VerseResult::new("A", "B"));
    }

    #[test]
    fn test_no_object() {
        assert_eq!(
            extract_verse("I cannot help with that."),
            Err(ExtractionError::NoJsonObject)
        );
    }

    #[test]
    fn test_broken_object() {
        let err = extract_verse("Sure! {\"reference\": \"A\", \"text\": ").unwrap_err();
        assert_eq!(err, ExtractionError::NoJsonObject);

        let err = extract_verse("Sure! {\"reference\": \"A\" \"text\": \"B\"}").unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidJson(_)));
    }

    #[test]
    fn test_missing_required_fields() {
        assert_eq!(
            extract_verse(r#"{"text":"B"}"#),
            Err(ExtractionError::MissingField("reference"))
        );
        assert_eq!(
            extract_verse(r#"{"reference":"A","text":""}"#),
            Err(ExtractionError::MissingField("text"))
        );
    }

    #[test]
    fn test_array_wrapped_object() {
        // an array is not a verse, but the brace scan finds the inner object
        let verse = extract_verse(r#"[{"reference":"A","text":"B"}]"#);
        assert_eq!(verse, Ok(VerseResult::new("A", "B")));
    }

    #[test]
    fn test_extraction_is_stable() {
        let text = "no json here";
        assert_eq!(extract_verse(text), extract_verse(text));
    }
}
