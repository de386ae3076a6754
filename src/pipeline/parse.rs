//! Response sanitization and parsing: raw completion to candidate records.
//!
//! ## Why sanitize at all?
//!
//! Even when the instruction says "return ONLY a valid JSON array", the
//! model frequently wraps its output in ` ```json … ``` ` fences or adds a
//! stray leading sentence. Stripping fences here rather than in the prompt
//! keeps the prompt focused on *what to generate*, not on formatting
//! edge-cases. Sanitization is a pure `&str → String` pass and is
//! idempotent: running it on its own output changes nothing.
//!
//! ## Fail-soft parsing
//!
//! A completion that still isn't a JSON array after sanitization yields an
//! **empty** candidate list, never an `Err` — "the model produced garbage"
//! converges with "every record failed validation" at the validator's
//! zero-survivors check, which is the single place that failure class is
//! decided. The serde message is kept on [`ParsedCandidates::parse_error`]
//! so the terminal `NoValidQuestions` error stays diagnosable.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

// Matches a triple-backtick fence marker with an optional language tag
// (```json, ```JSON, ``` …). Removed globally: the model sometimes nests
// prose around the fenced block, so anchoring to the start/end of the
// completion would miss real cases.
static RE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[A-Za-z]*").expect("static regex"));

/// Loosely-typed candidate records parsed from one completion.
#[derive(Debug, Default)]
pub struct ParsedCandidates {
    /// Untyped records, in completion order. Empty on any parse failure.
    pub records: Vec<Value>,
    /// The parse failure, when `records` is empty because of one.
    pub parse_error: Option<String>,
}

/// Strip code-fence artifacts and surrounding whitespace.
pub fn sanitize(raw: &str) -> String {
    RE_FENCE.replace_all(raw, "").trim().to_string()
}

/// Sanitize and strictly parse the completion into candidate records.
///
/// Never fails: a completion that does not parse as a JSON array produces
/// an empty record list with the reason attached.
pub fn parse_candidates(raw: &str) -> ParsedCandidates {
    let cleaned = sanitize(raw);

    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Array(records)) => {
            debug!("Parsed {} candidate records from completion", records.len());
            ParsedCandidates {
                records,
                parse_error: None,
            }
        }
        Ok(other) => {
            debug!("Completion parsed as JSON but is not an array");
            ParsedCandidates {
                records: Vec::new(),
                parse_error: Some(format!(
                    "expected a JSON array, got {}",
                    json_kind(&other)
                )),
            }
        }
        Err(e) => {
            debug!("Completion is not valid JSON: {}", e);
            ParsedCandidates {
                records: Vec::new(),
                parse_error: Some(e.to_string()),
            }
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        let raw = "```json\n[{\"question\":\"Q\"}]\n```";
        assert_eq!(sanitize(raw), "[{\"question\":\"Q\"}]");
    }

    #[test]
    fn strips_bare_fences() {
        let raw = "```\n[1,2]\n```";
        assert_eq!(sanitize(raw), "[1,2]");
    }

    #[test]
    fn bare_array_passes_through() {
        assert_eq!(sanitize("  [1,2] \n"), "[1,2]");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            "```json\n[{\"a\":1}]\n```",
            "  [1,2,3]  ",
            "Here you go:\n```json\n[]\n```\nDone.",
            "",
        ];
        for raw in inputs {
            let once = sanitize(raw);
            let twice = sanitize(&once);
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn fenced_and_bare_parse_identically() {
        let bare = r#"[{"question":"Q","type":"shortAnswer","answer":"A"}]"#;
        let fenced = format!("```json\n{bare}\n```");
        let a = parse_candidates(bare);
        let b = parse_candidates(&fenced);
        assert_eq!(a.records, b.records);
        assert_eq!(a.records.len(), 1);
    }

    #[test]
    fn invalid_json_yields_empty_with_error() {
        let parsed = parse_candidates("I'm sorry, I cannot generate questions for that.");
        assert!(parsed.records.is_empty());
        assert!(parsed.parse_error.is_some());
    }

    #[test]
    fn non_array_json_yields_empty_with_error() {
        let parsed = parse_candidates(r#"{"questions": []}"#);
        assert!(parsed.records.is_empty());
        assert!(parsed.parse_error.as_deref().unwrap().contains("an object"));
    }

    #[test]
    fn empty_array_is_zero_records_without_error() {
        let parsed = parse_candidates("[]");
        assert!(parsed.records.is_empty());
        assert!(parsed.parse_error.is_none());
    }
}
