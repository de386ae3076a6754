//! Eager (full-request) generation entry points.
//!
//! [`generate`] runs the whole pipeline for one request: extract the
//! syllabus text, build the instruction, call the model (with retries),
//! parse and validate the completion, and assemble the [`QuestionSet`].
//! The stages run sequentially and every `.await` is a cancellation
//! point, so dropping the future abandons the request cleanly.

use crate::config::GenerationConfig;
use crate::error::QuizForgeError;
use crate::pipeline::llm::{GeminiClient, TextGenerator};
use crate::pipeline::{extract, llm, parse, validate};
use crate::prompts;
use crate::question::{Fingerprint, GenerationStats, QuestionKind, QuestionSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where the syllabus text comes from.
#[derive(Debug, Clone)]
pub enum SyllabusSource {
    /// Syllabus text the caller already has.
    Text(String),
    /// An uploaded document to extract text from. `mime` is the
    /// declared content type (currently only `application/pdf`).
    Document { bytes: Vec<u8>, mime: String },
}

/// One question-paper request.
#[derive(Debug, Clone)]
pub struct PaperRequest {
    pub source: SyllabusSource,
    /// Difficulty, 0–100.
    pub difficulty: u8,
    /// Question kinds to generate. Duplicates are ignored; order is kept.
    pub kinds: Vec<QuestionKind>,
}

/// Generate a question paper from a syllabus.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(QuestionSet)` when at least one candidate survived validation,
/// even if others were dropped (check `set.stats.dropped_records`).
///
/// # Errors
/// - [`QuizForgeError::InvalidRequest`] for a bad request (difficulty
///   out of range, no kinds, empty syllabus)
/// - [`QuizForgeError::UnsupportedFormat`] / [`QuizForgeError::Extraction`]
///   when the document cannot be read
/// - [`QuizForgeError::MissingApiKey`] and the `Upstream*` variants for
///   credential and transport failures
/// - [`QuizForgeError::NoValidQuestions`] when the model responded but
///   nothing survived validation
pub async fn generate(
    request: &PaperRequest,
    config: &GenerationConfig,
) -> Result<QuestionSet, QuizForgeError> {
    let total_start = Instant::now();

    // ── Step 1: Validate the request ─────────────────────────────────────
    if request.difficulty > 100 {
        return Err(QuizForgeError::InvalidRequest(format!(
            "difficulty must be 0-100, got {}",
            request.difficulty
        )));
    }
    let kinds = dedup_kinds(&request.kinds);
    if kinds.is_empty() {
        return Err(QuizForgeError::InvalidRequest(
            "at least one question kind is required".into(),
        ));
    }
    info!(
        "Starting generation: difficulty={}, kinds={:?}",
        request.difficulty, kinds
    );

    // ── Step 2: Obtain syllabus text ─────────────────────────────────────
    let syllabus = match &request.source {
        SyllabusSource::Text(text) => text.clone(),
        SyllabusSource::Document { bytes, mime } => {
            extract::extract_text(bytes.clone(), mime).await?
        }
    };
    let syllabus = syllabus.trim().to_string();
    if syllabus.is_empty() {
        return Err(QuizForgeError::InvalidRequest(
            "syllabus text is empty".into(),
        ));
    }

    // The fingerprint hashes the full text so two requests that truncate
    // to the same prefix still get distinct fingerprints.
    let fingerprint = Fingerprint::new(&syllabus, request.difficulty, &kinds);
    let syllabus = truncate_chars(syllabus, config.max_syllabus_chars);

    // ── Step 3: Build the instruction ────────────────────────────────────
    let instruction = prompts::build_instruction(&syllabus, request.difficulty, &kinds)?;
    debug!("Instruction is {} chars", instruction.len());

    // ── Step 4: Call the model ───────────────────────────────────────────
    let generator = resolve_generator(config)?;
    let llm_start = Instant::now();
    let (completion, retries) = llm::run_with_retry(&generator, &instruction, config).await?;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;
    info!(
        "Model responded with {} chars in {}ms ({} retries)",
        completion.len(),
        llm_duration_ms,
        retries
    );

    // ── Step 5: Parse the completion ─────────────────────────────────────
    let parsed = parse::parse_candidates(&completion);
    if let Some(ref err) = parsed.parse_error {
        warn!("Completion did not parse as a question array: {}", err);
    }

    // ── Step 6: Validate candidates ──────────────────────────────────────
    let candidate_records = parsed.records.len();
    let (questions, dropped) = validate::validate_candidates(&parsed.records);
    if dropped > 0 {
        info!(
            "Dropped {}/{} candidate records during validation",
            dropped, candidate_records
        );
    }
    if questions.is_empty() {
        return Err(QuizForgeError::NoValidQuestions {
            candidates: candidate_records,
            parse_error: parsed.parse_error,
        });
    }

    // ── Step 7: Assemble the set ─────────────────────────────────────────
    let stats = GenerationStats {
        requested_questions: prompts::QUESTIONS_PER_KIND * kinds.len(),
        candidate_records,
        dropped_records: dropped,
        retries,
        llm_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Generation complete: {}/{} questions, {}ms total",
        questions.len(),
        stats.requested_questions,
        stats.total_duration_ms
    );

    Ok(QuestionSet {
        questions,
        fingerprint,
        stats,
    })
}

/// Generate from syllabus text the caller already holds.
pub async fn generate_from_text(
    syllabus: impl Into<String>,
    difficulty: u8,
    kinds: &[QuestionKind],
    config: &GenerationConfig,
) -> Result<QuestionSet, QuizForgeError> {
    let request = PaperRequest {
        source: SyllabusSource::Text(syllabus.into()),
        difficulty,
        kinds: kinds.to_vec(),
    };
    generate(&request, config).await
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    request: &PaperRequest,
    config: &GenerationConfig,
) -> Result<QuestionSet, QuizForgeError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| QuizForgeError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(request, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the text generator: a caller-injected one wins, otherwise a
/// Gemini client is built from the config (which requires an API key).
fn resolve_generator(
    config: &GenerationConfig,
) -> Result<Arc<dyn TextGenerator>, QuizForgeError> {
    if let Some(ref generator) = config.generator {
        return Ok(Arc::clone(generator));
    }
    Ok(Arc::new(GeminiClient::new(config)?))
}

/// Deduplicate kinds while keeping first-occurrence order.
fn dedup_kinds(kinds: &[QuestionKind]) -> Vec<QuestionKind> {
    let mut seen = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        if !seen.contains(&kind) {
            seen.push(kind);
        }
    }
    seen
}

/// Truncate to at most `max_chars` characters, on a char boundary.
fn truncate_chars(text: String, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text;
    }
    warn!(
        "Syllabus exceeds {} chars, truncating before prompting",
        max_chars
    );
    text.chars().take(max_chars).collect()
}
