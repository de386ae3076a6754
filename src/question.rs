//! Core data model: question kinds, questions, and the generated set.
//!
//! The serialized field names (`question`, `type`, `options`, `answer`) and
//! the kind tokens (`mcq`, `fillblanks`, `truefalse`, `matching`,
//! `longAnswer`, `shortAnswer`) are a wire contract with downstream
//! consumers — persistence and export layers match on them bit-exactly, so
//! they must never change, even where Rust naming conventions would differ.
//!
//! A [`Question`] is only ever constructed by the schema validator, so
//! holding a `Question` value is itself the proof that the per-kind
//! structural rule holds.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// The closed enumeration of question categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    /// Single-choice with discrete options.
    #[serde(rename = "mcq")]
    Mcq,
    /// Fill in the blank.
    #[serde(rename = "fillblanks")]
    FillBlanks,
    /// True/False.
    #[serde(rename = "truefalse")]
    TrueFalse,
    /// Match pairs of keys to values.
    #[serde(rename = "matching")]
    Matching,
    /// Free-form long answer.
    #[serde(rename = "longAnswer")]
    LongAnswer,
    /// Free-form short answer.
    #[serde(rename = "shortAnswer")]
    ShortAnswer,
}

impl QuestionKind {
    /// All kinds, in the order the prompt lists them.
    pub const ALL: [QuestionKind; 6] = [
        QuestionKind::Mcq,
        QuestionKind::FillBlanks,
        QuestionKind::TrueFalse,
        QuestionKind::Matching,
        QuestionKind::LongAnswer,
        QuestionKind::ShortAnswer,
    ];

    /// The canonical wire token for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Mcq => "mcq",
            QuestionKind::FillBlanks => "fillblanks",
            QuestionKind::TrueFalse => "truefalse",
            QuestionKind::Matching => "matching",
            QuestionKind::LongAnswer => "longAnswer",
            QuestionKind::ShortAnswer => "shortAnswer",
        }
    }

    /// Whether this kind carries an `options` list on the wire.
    pub fn uses_options(&self) -> bool {
        matches!(self, QuestionKind::Mcq | QuestionKind::TrueFalse | QuestionKind::Matching)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    /// Parse a canonical wire token. Tokens are matched exactly — the
    /// closed enumeration admits no aliases or case variants.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mcq" => Ok(QuestionKind::Mcq),
            "fillblanks" => Ok(QuestionKind::FillBlanks),
            "truefalse" => Ok(QuestionKind::TrueFalse),
            "matching" => Ok(QuestionKind::Matching),
            "longAnswer" => Ok(QuestionKind::LongAnswer),
            "shortAnswer" => Ok(QuestionKind::ShortAnswer),
            other => Err(format!(
                "unknown question kind '{other}' (expected one of: mcq, fillblanks, \
                 truefalse, matching, longAnswer, shortAnswer)"
            )),
        }
    }
}

/// One key/value pair of a matching question's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub key: String,
    pub value: String,
}

/// A question's answer: a plain string for most kinds, a pair list for
/// `matching`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    Pairs(Vec<MatchPair>),
}

/// A single validated question in the wire shape expected downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The prompt shown to the test-taker. Never empty.
    #[serde(rename = "question")]
    pub text: String,

    /// The question's category.
    #[serde(rename = "type")]
    pub kind: QuestionKind,

    /// Discrete choices; present only for kinds that use them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    /// The expected answer, shape constrained by `kind`.
    pub answer: Answer,
}

/// Traceability tag: which request produced a [`QuestionSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Requested difficulty, 0–100.
    pub difficulty: u8,
    /// Requested kinds, deduplicated, in request order.
    pub kinds: Vec<QuestionKind>,
    /// Hex SHA-256 of the (post-extraction, pre-truncation) syllabus text.
    pub syllabus_sha256: String,
}

impl Fingerprint {
    pub fn new(syllabus: &str, difficulty: u8, kinds: &[QuestionKind]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(syllabus.as_bytes());
        let syllabus_sha256 = hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();

        Self {
            difficulty,
            kinds: kinds.to_vec(),
            syllabus_sha256,
        }
    }
}

/// Timing and attrition counters for one pipeline invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// 5 × |requested kinds| — what the prompt asked the model for.
    pub requested_questions: usize,
    /// Candidate records parsed out of the raw completion.
    pub candidate_records: usize,
    /// Candidates dropped by schema validation.
    pub dropped_records: usize,
    /// Generation-call retries that were actually taken.
    pub retries: u32,
    /// Wall-clock time spent inside the generation call (incl. retries).
    pub llm_duration_ms: u64,
    /// End-to-end pipeline wall-clock time.
    pub total_duration_ms: u64,
}

/// The validated, ordered output of one pipeline invocation.
///
/// Immutable once returned; ownership passes to the caller, which decides
/// storage and lifetime. The question order is the order the model emitted
/// surviving records in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub questions: Vec<Question>,
    pub fingerprint: Fingerprint,
    pub stats: GenerationStats,
}

impl QuestionSet {
    /// Number of validated questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Serialize just the question array — the wire shape the original
    /// persistence layer stores (`[{question, type, options?, answer}]`).
    pub fn to_wire_json(&self) -> serde_json::Value {
        serde_json::json!(self.questions)
    }
}
