//! Error types for the quizforge library.
//!
//! Every variant of [`QuizForgeError`] is a terminal pipeline outcome: no
//! stage retries internally except the generation client, whose bounded
//! retry loop consults [`QuizForgeError::is_transient`]. The one deliberate
//! exception to "errors surface" is the sanitizer/parser stage, which
//! absorbs a malformed completion into an empty candidate list; the parse
//! message resurfaces as metadata on [`QuizForgeError::NoValidQuestions`]
//! so the failure stays diagnosable without changing the fail-soft
//! contract.

use thiserror::Error;

/// All fatal errors returned by the quizforge library.
#[derive(Debug, Clone, Error)]
pub enum QuizForgeError {
    // ── Caller errors ─────────────────────────────────────────────────────
    /// The request itself is malformed (empty syllabus, empty kind set,
    /// difficulty out of range).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The uploaded document's declared media type is not supported.
    #[error("Unsupported document format '{mime}': only application/pdf is supported")]
    UnsupportedFormat { mime: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The document could not be parsed as its declared type, or yielded no
    /// extractable text.
    #[error("Failed to extract text from document: {detail}")]
    Extraction { detail: String },

    // ── Generation client errors ──────────────────────────────────────────
    /// No API credential was configured (operator fault, not caller fault).
    #[error(
        "Generation API key is not configured.\n\
         Pass one via GenerationConfig::builder().api_key(..), or set \
         GEMINI_API_KEY when using the CLI."
    )]
    MissingApiKey,

    /// The generative service returned a non-success HTTP status.
    /// The body is kept for operator diagnostics; never show it to end users.
    #[error("Generation service unavailable (HTTP {status}): {body}")]
    UpstreamUnavailable { status: u16, body: String },

    /// The generation call exceeded the configured timeout.
    #[error("Generation call timed out after {secs}s")]
    UpstreamTimeout { secs: u64 },

    /// The network call to the generative service failed outright.
    #[error("Failed to reach generation service: {reason}")]
    UpstreamConnect { reason: String },

    /// The service answered successfully but returned no candidate
    /// completion to work with.
    #[error("Generation service returned no completion candidates")]
    EmptyResponse,

    // ── Validation errors ─────────────────────────────────────────────────
    /// Every candidate record failed schema validation (or the completion
    /// did not parse at all — see `parse_error`).
    #[error("No valid questions produced ({candidates} candidate records, all dropped)")]
    NoValidQuestions {
        candidates: usize,
        /// Present when the raw completion failed to parse as a JSON array.
        parse_error: Option<String>,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuizForgeError {
    /// Whether a retry of the generation call could plausibly succeed.
    ///
    /// Timeouts, connection failures, and overload statuses (429, 5xx) are
    /// transient; auth failures and other 4xx are not, and neither is a
    /// successful-but-empty response.
    pub fn is_transient(&self) -> bool {
        match self {
            QuizForgeError::UpstreamTimeout { .. } => true,
            QuizForgeError::UpstreamConnect { .. } => true,
            QuizForgeError::UpstreamUnavailable { status, .. } => {
                *status == 429 || *status >= 500
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(QuizForgeError::UpstreamTimeout { secs: 30 }.is_transient());
        assert!(QuizForgeError::UpstreamConnect {
            reason: "dns".into()
        }
        .is_transient());
        assert!(QuizForgeError::UpstreamUnavailable {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(QuizForgeError::UpstreamUnavailable {
            status: 429,
            body: String::new()
        }
        .is_transient());
    }

    #[test]
    fn non_transient_classification() {
        assert!(!QuizForgeError::UpstreamUnavailable {
            status: 401,
            body: String::new()
        }
        .is_transient());
        assert!(!QuizForgeError::MissingApiKey.is_transient());
        assert!(!QuizForgeError::EmptyResponse.is_transient());
        assert!(!QuizForgeError::NoValidQuestions {
            candidates: 0,
            parse_error: None
        }
        .is_transient());
    }

    #[test]
    fn upstream_display_carries_status_and_body() {
        let e = QuizForgeError::UpstreamUnavailable {
            status: 503,
            body: "overloaded".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("503"), "got: {msg}");
        assert!(msg.contains("overloaded"), "got: {msg}");
    }

    #[test]
    fn no_valid_questions_display() {
        let e = QuizForgeError::NoValidQuestions {
            candidates: 7,
            parse_error: None,
        };
        assert!(e.to_string().contains("7 candidate records"));
    }

    #[test]
    fn unsupported_format_display() {
        let e = QuizForgeError::UnsupportedFormat {
            mime: "image/png".into(),
        };
        assert!(e.to_string().contains("image/png"));
    }
}
