//! Generation client: drive the generative-language API call.
//!
//! This module is intentionally thin — all prompt engineering lives in
//! [`crate::prompts`] so it can change without touching the retry or
//! error-mapping logic here.
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 5xx responses and timeouts are transient and frequent under
//! load. The retry loop uses exponential backoff with up to 50% random
//! jitter (`retry_backoff_ms * 2^attempt + jitter`) so independent
//! pipelines recovering from the same outage don't hit the endpoint in
//! lockstep. Non-transient failures (auth, malformed request, empty
//! completion) surface immediately. `max_retries = 0` restores strict
//! single-attempt behaviour.

use crate::config::GenerationConfig;
use crate::error::QuizForgeError;
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// The seam between the pipeline and the upstream model.
///
/// Production uses [`GeminiClient`]; tests inject scripted implementations
/// through [`GenerationConfig::generator`]. Implementations should return
/// the raw completion text untouched — sanitization is the parser stage's
/// job.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, QuizForgeError>;
}

// ── Gemini REST wire types ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationParams,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct GenerationParams {
    temperature: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Pull the first candidate's first text part, if any.
    fn into_completion(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|p| p.text)
    }
}

// ── Production client ────────────────────────────────────────────────────

/// Generation client for the Gemini `generateContent` REST endpoint.
///
/// The credential is injected at construction and held for the client's
/// lifetime; nothing here reads the process environment.
#[derive(Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    timeout_secs: u64,
    params: GenerationParams,
}

impl GeminiClient {
    /// Build a client from the configuration.
    ///
    /// # Errors
    /// `MissingApiKey` when no credential is configured; `Internal` when
    /// the HTTP client cannot be constructed.
    pub fn new(config: &GenerationConfig) -> Result<Self, QuizForgeError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(QuizForgeError::MissingApiKey)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| QuizForgeError::Internal(format!("failed to build HTTP client: {e}")))?;

        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.api_base.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            http,
            api_key,
            endpoint,
            timeout_secs: config.api_timeout_secs,
            params: GenerationParams {
                temperature: config.temperature,
                top_k: config.top_k,
                top_p: config.top_p,
                max_output_tokens: config.max_output_tokens,
            },
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, QuizForgeError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: self.params.clone(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QuizForgeError::UpstreamTimeout {
                        secs: self.timeout_secs,
                    }
                } else {
                    QuizForgeError::UpstreamConnect {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Generation API returned HTTP {}: {}", status, body);
            return Err(QuizForgeError::UpstreamUnavailable {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            QuizForgeError::Internal(format!("malformed generation response body: {e}"))
        })?;

        parsed
            .into_completion()
            .filter(|text| !text.is_empty())
            .ok_or(QuizForgeError::EmptyResponse)
    }
}

// ── Retry wrapper ────────────────────────────────────────────────────────

/// Run one generation call through the bounded timeout + retry policy.
///
/// Returns the raw completion and the number of retries actually taken.
/// The timeout is enforced here with [`tokio::time::timeout`] so injected
/// generators are bounded exactly like the production client.
pub async fn run_with_retry(
    generator: &Arc<dyn TextGenerator>,
    prompt: &str,
    config: &GenerationConfig,
) -> Result<(String, u32), QuizForgeError> {
    let mut last_err = QuizForgeError::Internal("generation never attempted".into());

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let base = config.retry_backoff_ms.saturating_mul(1 << (attempt - 1));
            let jitter = rand::thread_rng().gen_range(0..=base / 2);
            let backoff = base + jitter;
            warn!(
                "Generation retry {}/{} after {}ms",
                attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        let bounded = timeout(
            Duration::from_secs(config.api_timeout_secs),
            generator.generate(prompt),
        )
        .await;

        let result = match bounded {
            Ok(inner) => inner,
            Err(_) => Err(QuizForgeError::UpstreamTimeout {
                secs: config.api_timeout_secs,
            }),
        };

        match result {
            Ok(raw) => {
                debug!(
                    "Generation succeeded on attempt {} ({} chars)",
                    attempt + 1,
                    raw.len()
                );
                return Ok((raw, attempt));
            }
            Err(e) => {
                warn!("Generation attempt {} failed: {}", attempt + 1, e);
                let retryable = e.is_transient();
                last_err = e;
                if !retryable {
                    break;
                }
            }
        }
    }

    Err(last_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyGenerator {
        failures_before_success: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl TextGenerator for FlakyGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, QuizForgeError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures_before_success {
                Err(QuizForgeError::UpstreamUnavailable {
                    status: 503,
                    body: "overloaded".into(),
                })
            } else {
                Ok("[]".into())
            }
        }
    }

    struct AuthFailGenerator;

    #[async_trait]
    impl TextGenerator for AuthFailGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, QuizForgeError> {
            Err(QuizForgeError::UpstreamUnavailable {
                status: 403,
                body: "bad key".into(),
            })
        }
    }

    fn fast_config() -> GenerationConfig {
        GenerationConfig::builder()
            .max_retries(2)
            .retry_backoff_ms(1)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn retries_transient_failures() {
        let scripted: Arc<dyn TextGenerator> = Arc::new(FlakyGenerator {
            failures_before_success: 2,
            calls: AtomicU32::new(0),
        });
        let (raw, retries) = run_with_retry(&scripted, "prompt", &fast_config()).await.unwrap();
        assert_eq!(raw, "[]");
        assert_eq!(retries, 2);
    }

    #[tokio::test]
    async fn exhausted_retries_return_last_error() {
        let scripted: Arc<dyn TextGenerator> = Arc::new(FlakyGenerator {
            failures_before_success: 10,
            calls: AtomicU32::new(0),
        });
        let err = run_with_retry(&scripted, "prompt", &fast_config()).await.unwrap_err();
        assert!(matches!(
            err,
            QuizForgeError::UpstreamUnavailable { status: 503, .. }
        ));
    }

    #[tokio::test]
    async fn non_transient_failure_is_not_retried() {
        let scripted: Arc<dyn TextGenerator> = Arc::new(AuthFailGenerator);
        let start = std::time::Instant::now();
        let err = run_with_retry(&scripted, "prompt", &fast_config()).await.unwrap_err();
        assert!(matches!(
            err,
            QuizForgeError::UpstreamUnavailable { status: 403, .. }
        ));
        // No backoff sleeps should have happened.
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn slow_generator_hits_timeout() {
        struct SlowGenerator;

        #[async_trait]
        impl TextGenerator for SlowGenerator {
            async fn generate(&self, _prompt: &str) -> Result<String, QuizForgeError> {
                sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
        }

        let config = GenerationConfig::builder()
            .api_timeout_secs(1)
            .max_retries(0)
            .build()
            .unwrap();

        let scripted: Arc<dyn TextGenerator> = Arc::new(SlowGenerator);
        tokio::time::pause();
        let fut = run_with_retry(&scripted, "prompt", &config);
        tokio::pin!(fut);
        // Advancing the paused clock past the timeout fires it immediately.
        let err = fut.await.unwrap_err();
        assert!(matches!(err, QuizForgeError::UpstreamTimeout { secs: 1 }));
    }

    #[test]
    fn gemini_client_requires_api_key() {
        let config = GenerationConfig::default();
        assert!(matches!(
            GeminiClient::new(&config).unwrap_err(),
            QuizForgeError::MissingApiKey
        ));

        let config = GenerationConfig::builder().api_key("").build().unwrap();
        assert!(matches!(
            GeminiClient::new(&config).unwrap_err(),
            QuizForgeError::MissingApiKey
        ));
    }

    #[test]
    fn gemini_endpoint_shape() {
        let config = GenerationConfig::builder()
            .api_key("k")
            .api_base("https://generativelanguage.googleapis.com/v1/")
            .model("gemini-1.5-flash")
            .build()
            .unwrap();
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint,
            "https://generativelanguage.googleapis.com/v1/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn response_extraction() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"[{\"q\":1}]"}]}}]}"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_completion().unwrap(), "[{\"q\":1}]");

        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.into_completion().is_none());

        let no_field: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(no_field.into_completion().is_none());
    }
}
