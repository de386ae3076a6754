//! Configuration for question-paper generation.
//!
//! All behaviour is controlled through [`GenerationConfig`], built via its
//! [`GenerationConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across requests and to diff two runs to
//! understand why their outputs differ.
//!
//! The API credential lives here as an explicit value handed to the
//! generation client at construction — the library never reads it from the
//! process environment at call time, so two pipelines in one process can
//! use different credentials.

use crate::error::QuizForgeError;
use crate::pipeline::llm::TextGenerator;
use std::fmt;
use std::sync::Arc;

/// Configuration for one or more pipeline invocations.
///
/// Built via [`GenerationConfig::builder()`] or [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use quizforge::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .api_key("AIza...")
///     .model("gemini-1.5-flash")
///     .api_timeout_secs(20)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Credential for the generative-language API. Required unless a
    /// pre-built [`TextGenerator`] is injected via `generator`.
    pub api_key: Option<String>,

    /// Model identifier. Default: "gemini-1.5-flash".
    pub model: String,

    /// Base URL of the generative-language API. Default:
    /// "https://generativelanguage.googleapis.com/v1". Override to point a
    /// test at a local stub server.
    pub api_base: String,

    /// Pre-constructed generator. Takes precedence over `api_key`/`model`;
    /// the main seam for injecting a scripted generator in tests.
    pub generator: Option<Arc<dyn TextGenerator>>,

    /// Sampling temperature. Default: 0.7.
    ///
    /// Question generation wants some variety between runs, unlike
    /// transcription tasks that pin this near zero. 0.7 matches the
    /// upstream default the system was tuned against.
    pub temperature: f32,

    /// Top-k sampling cutoff. Default: 40.
    pub top_k: u32,

    /// Nucleus sampling cutoff. Default: 0.95.
    pub top_p: f32,

    /// Maximum tokens the model may generate. Default: 2048.
    ///
    /// 30 questions (5 per kind × 6 kinds) with options fit comfortably in
    /// 2048 tokens; raising it mostly raises the cost ceiling of a
    /// runaway completion.
    pub max_output_tokens: u32,

    /// Maximum retry attempts on a transient generation failure. Default: 2.
    ///
    /// Overload statuses (429/5xx) and timeouts are retried with
    /// exponential, jittered backoff; everything else fails immediately.
    /// Set to 0 for strict single-attempt behaviour.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds. Default: 500.
    ///
    /// Doubles after each attempt, plus up to 50% random jitter so
    /// concurrent pipelines don't retry in lockstep against a recovering
    /// endpoint.
    pub retry_backoff_ms: u64,

    /// Per-generation-call timeout in seconds. Default: 30.
    ///
    /// Applied uniformly around the generator call, so injected generators
    /// are bounded too.
    pub api_timeout_secs: u64,

    /// Maximum syllabus length in chars fed to the prompt. Default: 24_000.
    ///
    /// Longer syllabi (typically large uploaded PDFs) are truncated at a
    /// char boundary with a warning rather than rejected; unbounded prompts
    /// risk upstream rejection or cost blowup.
    pub max_syllabus_chars: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1".to_string(),
            generator: None,
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
            max_retries: 2,
            retry_backoff_ms: 500,
            api_timeout_secs: 30,
            max_syllabus_chars: 24_000,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("generator", &self.generator.as_ref().map(|_| "<dyn TextGenerator>"))
            .field("temperature", &self.temperature)
            .field("top_k", &self.top_k)
            .field("top_p", &self.top_p)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_syllabus_chars", &self.max_syllabus_chars)
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn top_k(mut self, k: u32) -> Self {
        self.config.top_k = k.max(1);
        self
    }

    pub fn top_p(mut self, p: f32) -> Self {
        self.config.top_p = p.clamp(0.0, 1.0);
        self
    }

    pub fn max_output_tokens(mut self, n: u32) -> Self {
        self.config.max_output_tokens = n.max(1);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_syllabus_chars(mut self, n: usize) -> Self {
        self.config.max_syllabus_chars = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, QuizForgeError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(QuizForgeError::InvalidConfig(
                "Model identifier must not be empty".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(QuizForgeError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_syllabus_chars < 100 {
            return Err(QuizForgeError::InvalidConfig(format!(
                "max_syllabus_chars must be ≥ 100, got {}",
                c.max_syllabus_chars
            )));
        }
        Ok(self.config)
    }
}
