//! Schema validation: untyped candidate records to typed [`Question`]s.
//!
//! The parser hands over `serde_json::Value`s because the model's output
//! shape is not statically guaranteed. This stage is the only way a
//! [`Question`] gets constructed, so the per-kind structural rules hold for
//! every value of that type in the program.
//!
//! Validation is per-record: a record that violates its kind's rule is
//! dropped with a debug log, and the rest of the batch survives. The
//! orchestrator decides what zero survivors means.
//!
//! Per-kind rules:
//!
//! | kind | options | answer |
//! |---|---|---|
//! | mcq | ≥2 strings | string |
//! | truefalse | exactly {"True","False"}, auto-filled if absent | "True" or "False" |
//! | matching | even count of strings (may be absent) | non-empty list of non-empty key/value pairs |
//! | fillblanks, longAnswer, shortAnswer | stripped if present | string |

use crate::question::{Answer, MatchPair, Question, QuestionKind};
use serde_json::Value;
use tracing::debug;

/// Validate a batch of candidate records.
///
/// Returns the surviving questions in input order and the number of
/// records dropped.
pub fn validate_candidates(records: &[Value]) -> (Vec<Question>, usize) {
    let mut questions = Vec::with_capacity(records.len());
    let mut dropped = 0usize;

    for (i, record) in records.iter().enumerate() {
        match validate_record(record) {
            Ok(q) => questions.push(q),
            Err(reason) => {
                debug!("Dropping candidate record {}: {}", i, reason);
                dropped += 1;
            }
        }
    }

    (questions, dropped)
}

/// Validate one candidate record, or explain why it is dropped.
fn validate_record(v: &Value) -> Result<Question, String> {
    let obj = v.as_object().ok_or("record is not a JSON object")?;

    let text = obj
        .get("question")
        .and_then(Value::as_str)
        .ok_or("missing or non-string 'question' field")?
        .trim();
    if text.is_empty() {
        return Err("empty 'question' text".into());
    }

    let kind_token = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or("missing or non-string 'type' field")?;
    let kind: QuestionKind = kind_token.parse()?;

    let (options, answer) = match kind {
        QuestionKind::Mcq => validate_mcq(obj)?,
        QuestionKind::TrueFalse => validate_truefalse(obj)?,
        QuestionKind::Matching => validate_matching(obj)?,
        QuestionKind::FillBlanks | QuestionKind::LongAnswer | QuestionKind::ShortAnswer => {
            validate_text_answer(obj)?
        }
    };

    Ok(Question {
        text: text.to_string(),
        kind,
        options,
        answer,
    })
}

type Validated = (Option<Vec<String>>, Answer);

fn validate_mcq(obj: &serde_json::Map<String, Value>) -> Result<Validated, String> {
    let options = string_options(obj)?.ok_or("mcq requires an 'options' array")?;
    if options.len() < 2 {
        return Err(format!("mcq needs ≥2 options, got {}", options.len()));
    }
    let answer = string_answer(obj)?;
    Ok((Some(options), Answer::Text(answer)))
}

fn validate_truefalse(obj: &serde_json::Map<String, Value>) -> Result<Validated, String> {
    let options = match string_options(obj)? {
        Some(opts) => {
            let is_exact_set = opts.len() == 2
                && opts.iter().any(|o| o == "True")
                && opts.iter().any(|o| o == "False");
            if !is_exact_set {
                return Err(format!(
                    "truefalse options must be exactly {{\"True\",\"False\"}}, got {opts:?}"
                ));
            }
            opts
        }
        // Structural invariant, not model output: the two options are
        // implied by the kind, so they are auto-filled when absent.
        None => vec!["True".to_string(), "False".to_string()],
    };

    let answer = string_answer(obj)?;
    if answer != "True" && answer != "False" {
        return Err(format!(
            "truefalse answer must be \"True\" or \"False\", got {answer:?}"
        ));
    }
    Ok((Some(options), Answer::Text(answer)))
}

fn validate_matching(obj: &serde_json::Map<String, Value>) -> Result<Validated, String> {
    let options = match string_options(obj)? {
        Some(opts) => {
            if opts.len() % 2 != 0 {
                return Err(format!(
                    "matching needs an even option count (pairs), got {}",
                    opts.len()
                ));
            }
            Some(opts)
        }
        None => None,
    };

    let pairs_value = obj
        .get("answer")
        .and_then(Value::as_array)
        .ok_or("matching answer must be an array of key/value pairs")?;
    if pairs_value.is_empty() {
        return Err("matching answer must not be empty".into());
    }

    let mut pairs = Vec::with_capacity(pairs_value.len());
    for pair in pairs_value {
        let key = pair.get("key").and_then(Value::as_str).unwrap_or("");
        let value = pair.get("value").and_then(Value::as_str).unwrap_or("");
        if key.is_empty() || value.is_empty() {
            return Err("matching pair with empty key or value".into());
        }
        pairs.push(MatchPair {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    Ok((options, Answer::Pairs(pairs)))
}

fn validate_text_answer(obj: &serde_json::Map<String, Value>) -> Result<Validated, String> {
    // Open-ended kinds never carry options on the wire; a stray list from
    // the model is stripped rather than failing the record.
    let answer = string_answer(obj)?;
    Ok((None, Answer::Text(answer)))
}

/// Read `options` as a list of strings, if present.
fn string_options(obj: &serde_json::Map<String, Value>) -> Result<Option<Vec<String>>, String> {
    match obj.get("options") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str() {
                    Some(s) => out.push(s.to_string()),
                    None => return Err("non-string entry in 'options'".into()),
                }
            }
            Ok(Some(out))
        }
        Some(_) => Err("'options' is not an array".into()),
    }
}

/// Read `answer` as a string.
fn string_answer(obj: &serde_json::Map<String, Value>) -> Result<String, String> {
    obj.get("answer")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| "missing or non-string 'answer' field".into())
}
