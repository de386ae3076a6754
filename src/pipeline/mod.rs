//! Pipeline stages for syllabus-to-question-paper generation.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a different extraction backend or generation
//! provider) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ prompt ──▶ llm ──▶ parse ──▶ validate
//! (PDF→text)  (template) (Gemini) (fences,  (per-kind
//!                                  JSON)     schema)
//! ```
//!
//! 1. [`extract`]  — uploaded PDF bytes to plain syllabus text; runs in
//!    `spawn_blocking` because PDF parsing is CPU-bound
//! 2. prompt       — deterministic instruction template
//!    (lives in [`crate::prompts`], shared with the test suite)
//! 3. [`llm`]      — drive the generation call with timeout and bounded,
//!    jittered retry; the only stage with network I/O
//! 4. [`parse`]    — strip fence artifacts and parse the completion into
//!    loosely-typed candidate records (fail-soft: garbage becomes an empty
//!    list, never an error)
//! 5. [`validate`] — convert candidates into typed [`crate::Question`]s,
//!    dropping records that violate their kind's structural rule
//!
//! The stages run strictly sequentially — each consumes the previous
//! stage's output — and transitions are one-way; there are no loops
//! between stages.

pub mod extract;
pub mod llm;
pub mod parse;
pub mod validate;
