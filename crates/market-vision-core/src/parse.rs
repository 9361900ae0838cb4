//! Turning model text into an [`AnalysisResult`].
//!
//! Models are told to answer with raw JSON but often wrap it in a markdown
//! code fence anyway. Parsing is tried as-is first, then once more with the
//! fence markers removed. Nothing else is repaired.

use crate::analysis::AnalysisResult;
use crate::error::RelayError;
use regex::Regex;
use std::sync::LazyLock;

static FENCE_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\n?|\n?```").expect("fence pattern is valid"));

/// Remove every ```` ```json ```` / ```` ``` ```` marker (with an adjacent newline).
pub fn strip_code_fences(text: &str) -> String {
    FENCE_MARKERS.replace_all(text, "").into_owned()
}

/// Parse and validate the model's answer.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, RelayError> {
    let analysis = match serde_json::from_str::<AnalysisResult>(text) {
        Ok(analysis) => analysis,
        Err(first) => {
            tracing::debug!("Direct parse failed ({first}), retrying without code fences");
            let cleaned = strip_code_fences(text);
            serde_json::from_str::<AnalysisResult>(&cleaned)
                .map_err(|e| RelayError::MalformedResult(e.to_string()))?
        }
    };
    analysis.validate()?;
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Signal;

    const RAW: &str =
        r#"{"signal":"BUY","confidence":80,"technical":[],"fundamental":[],"reasoning":"ok"}"#;

    #[test]
    fn test_parses_raw_json() {
        let analysis = parse_analysis(RAW).unwrap();
        assert_eq!(analysis.signal, Signal::Buy);
        assert_eq!(analysis.confidence, 80);
        assert_eq!(analysis.reasoning, "ok");
    }

    #[test]
    fn test_fenced_json_matches_raw() {
        let fenced = format!("```json\n{RAW}\n```");
        assert_eq!(parse_analysis(&fenced).unwrap(), parse_analysis(RAW).unwrap());
    }

    #[test]
    fn test_bare_fence_without_language() {
        let fenced = format!("```\n{RAW}\n```");
        assert_eq!(parse_analysis(&fenced).unwrap(), parse_analysis(RAW).unwrap());
    }

    #[test]
    fn test_fence_with_surrounding_whitespace() {
        let fenced = format!("\n  ```json\n{RAW}\n```  \n");
        assert_eq!(parse_analysis(&fenced).unwrap().confidence, 80);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```json{}```"), "{}");
        assert_eq!(strip_code_fences("{}"), "{}");
    }

    #[test]
    fn test_trailing_commentary_is_malformed() {
        let text = format!("{RAW}\nHope this helps!");
        let err = parse_analysis(&text).unwrap_err();
        assert!(matches!(err, RelayError::MalformedResult(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_truncated_json_is_malformed() {
        let err = parse_analysis(&RAW[..RAW.len() - 10]).unwrap_err();
        assert!(matches!(err, RelayError::MalformedResult(_)));
    }

    #[test]
    fn test_plain_prose_is_malformed() {
        let err = parse_analysis("I cannot analyze this image.").unwrap_err();
        assert!(matches!(err, RelayError::MalformedResult(_)));
    }

    #[test]
    fn test_schema_violation_is_malformed() {
        let text = r#"{"signal":"BUY","confidence":150,"technical":[],"fundamental":[],"reasoning":"ok"}"#;
        let err = parse_analysis(text).unwrap_err();
        assert!(matches!(err, RelayError::MalformedResult(_)));
    }

    #[test]
    fn test_missing_required_field_is_malformed() {
        let text = r#"{"signal":"BUY","confidence":80,"technical":[],"reasoning":"ok"}"#;
        let err = parse_analysis(text).unwrap_err();
        assert!(err.to_string().contains("fundamental"));
    }
}
