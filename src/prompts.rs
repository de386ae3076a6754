//! Instruction templates for question-paper generation.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the downstream sanitizer and validator
//!    are tuned to exactly what this instruction demands (bare JSON array,
//!    canonical kind tokens, options only where a kind uses them). Changing
//!    the contract means changing one place.
//!
//! 2. **Testability** — unit tests inspect the built instruction directly
//!    without calling a real model, so prompt regressions are cheap to
//!    catch.

use crate::error::QuizForgeError;
use crate::question::QuestionKind;

/// How many questions the model is instructed to produce per requested kind.
pub const QUESTIONS_PER_KIND: usize = 5;

/// Build the deterministic instruction string for one generation call.
///
/// The instruction encodes the whole generation contract: exactly
/// [`QUESTIONS_PER_KIND`] questions per kind, syllabus-only content, no
/// near-duplicates across kinds, a single bare JSON array, `options` only
/// for kinds with discrete choices, and canonical `type` tokens. The worked
/// example at the end anchors the model on the exact field names.
///
/// # Errors
/// `InvalidRequest` when the syllabus is empty (after trimming) or the kind
/// set is empty. Difficulty is taken as already validated (0–100) by the
/// orchestrator.
pub fn build_instruction(
    syllabus: &str,
    difficulty: u8,
    kinds: &[QuestionKind],
) -> Result<String, QuizForgeError> {
    if syllabus.trim().is_empty() {
        return Err(QuizForgeError::InvalidRequest(
            "Syllabus text must not be empty".into(),
        ));
    }
    if kinds.is_empty() {
        return Err(QuizForgeError::InvalidRequest(
            "At least one question kind must be requested".into(),
        ));
    }

    let kind_list = kinds
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        r#"You are an AI-powered question paper generator. Generate **{per_kind} questions per type** strictly based on the given syllabus.

- **Syllabus:** {syllabus}
- **Difficulty Level:** {difficulty}% out of 100%
- **Question Types:** {kind_list} (comma-separated)

### **Instructions:**
 1. Extract all question types from the input (e.g., mcq, truefalse, shortAnswer, fillblanks).
 2. **Strictly generate questions ONLY from the syllabus**. Do NOT include irrelevant topics.
 3. Ensure **no repeated or similar questions** across all types.
 4. Return **EXACTLY** {per_kind} questions per type.
 5. **Return ONLY a valid JSON array** with no extra text.
 6. Ensure **options[] exists only for "mcq" and "matching" question types**.
 7. Ensure **type values strictly match**: "mcq", "fillblanks", "truefalse", "matching", "longAnswer", "shortAnswer".
 8. **For question types other than mcq and matching, DO NOT return the "options" field.**

### **Output Format (Strict JSON):**
[
  {{ "question": "What is recursion?", "type": "mcq", "options": ["Function calls itself", "Loop", "Variable", "None"], "answer": "Function calls itself" }},
  {{ "question": "Explain polymorphism in OOP.", "type": "shortAnswer", "answer": "Polymorphism allows objects to be treated as instances of their parent class." }},
  {{ "question": "True or False: A linked list is a static data structure.", "type": "truefalse", "answer": "False" }},
  {{ "question": "_____ is the process of finding the shortest path in a graph.", "type": "fillblanks", "answer": "Dijkstra's Algorithm" }}
]"#,
        per_kind = QUESTIONS_PER_KIND,
        syllabus = syllabus,
        difficulty = difficulty,
        kind_list = kind_list,
    ))
}
