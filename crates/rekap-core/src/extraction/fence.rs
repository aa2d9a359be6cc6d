//! Locating the JSON payload inside free-form model output.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ExtractionError;

lazy_static! {
    // A ```json fence; an unterminated fence runs to the end of the text.
    static ref JSON_FENCE: Regex = Regex::new(r"(?s)```json(.*?)(?:```|\z)").unwrap();

    // Any ``` fence, used when no ```json fence is present.
    static ref ANY_FENCE: Regex = Regex::new(r"(?s)```(.*?)(?:```|\z)").unwrap();
}

/// Return the JSON object text inside `text`.
///
/// Only the first fenced block is considered. Within it (or within the
/// whole text when unfenced) the payload spans from the first `{` to the
/// last `}`.
pub fn extract_json_payload(text: &str) -> Result<&str, ExtractionError> {
    let body = JSON_FENCE
        .captures(text)
        .or_else(|| ANY_FENCE.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
        .trim();

    let start = body.find('{').ok_or(ExtractionError::NoJsonPayload)?;
    let end = body.rfind('}').ok_or(ExtractionError::NoJsonPayload)?;
    if end < start {
        return Err(ExtractionError::NoJsonPayload);
    }

    Ok(&body[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        assert_eq!(extract_json_payload(r#"  {"a": 1}  "#).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_json_fence() {
        let text = "Berikut hasilnya:\n```json\n{\"a\": 1}\n```\nSemoga membantu.";
        assert_eq!(extract_json_payload(text).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_bare_fence() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_payload(text).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_only_first_block_is_used() {
        let text = "```json\n{\"a\": 1}\n```\n\n```json\n{\"b\": 2}\n```";
        assert_eq!(extract_json_payload(text).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_json_fence_preferred_over_earlier_bare_fence() {
        let text = "```\nnotes\n```\n```json\n{\"a\": 1}\n```";
        assert_eq!(extract_json_payload(text).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_unterminated_fence() {
        let text = "```json\n{\"a\": {\"b\": 2}}";
        assert_eq!(extract_json_payload(text).unwrap(), r#"{"a": {"b": 2}}"#);
    }

    #[test]
    fn test_surrounding_prose() {
        let text = "Tentu! {\"no_invoice\": \"X-1\"} adalah hasilnya.";
        assert_eq!(extract_json_payload(text).unwrap(), r#"{"no_invoice": "X-1"}"#);
    }

    #[test]
    fn test_no_payload() {
        assert!(matches!(
            extract_json_payload("Maaf, gambar tidak terbaca."),
            Err(ExtractionError::NoJsonPayload)
        ));
        assert!(matches!(
            extract_json_payload("} backwards {"),
            Err(ExtractionError::NoJsonPayload)
        ));
    }
}
