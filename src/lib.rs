//! # quizforge
//!
//! Generate exam question papers from syllabus documents with Gemini.
//!
//! ## Why this crate?
//!
//! Turning a syllabus into a usable question paper takes more than one
//! model call: the syllabus may arrive as a PDF, the model wraps its JSON
//! in Markdown fences, and individual records routinely violate the schema
//! (a true/false question answered "Maybe", an MCQ with one option). This
//! crate runs the whole pipeline and hands back only questions that passed
//! per-kind validation, with stats describing what was dropped and why.
//!
//! ## Pipeline Overview
//!
//! ```text
//! syllabus (text or PDF)
//!  │
//!  ├─ 1. Extract   PDF → plain text (CPU-bound, spawn_blocking)
//!  ├─ 2. Prompt    deterministic instruction: difficulty, kinds, JSON contract
//!  ├─ 3. Generate  Gemini generateContent, bounded retry + jittered backoff
//!  ├─ 4. Parse     strip code fences, fail-soft JSON parse to candidates
//!  ├─ 5. Validate  per-kind schema rules, drop record not batch
//!  └─ 6. Assemble  QuestionSet: questions + fingerprint + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quizforge::{generate_from_text, GenerationConfig, QuestionKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GenerationConfig::builder()
//!         .api_key("AIza...")
//!         .build()?;
//!     let set = generate_from_text(
//!         "Operating systems: processes, scheduling, virtual memory",
//!         60,
//!         &[QuestionKind::Mcq, QuestionKind::TrueFalse],
//!         &config,
//!     )
//!     .await?;
//!     println!("{}", serde_json::to_string_pretty(&set.to_wire_json())?);
//!     eprintln!("kept {} of {} candidates", set.len(), set.stats.candidate_records);
//!     Ok(())
//! }
//! ```
//!
//! ## Testing without the network
//!
//! [`GenerationConfig::builder`] accepts any [`TextGenerator`], so tests
//! inject a scripted generator and exercise the full parse/validate path
//! offline. See `tests/pipeline.rs` for the pattern.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `quizforge` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! quizforge = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod prompts;
pub mod question;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GenerationConfig, GenerationConfigBuilder};
pub use error::QuizForgeError;
pub use generate::{generate, generate_from_text, generate_sync, PaperRequest, SyllabusSource};
pub use pipeline::llm::{GeminiClient, TextGenerator};
pub use question::{
    Answer, Fingerprint, GenerationStats, MatchPair, Question, QuestionKind, QuestionSet,
};
