use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use super::AiError;
use crate::config::Config;
use crate::util::validate_base_url;

static GEMINI_API_KEY: OnceLock<Option<SecretString>> = OnceLock::new();

fn env_api_key() -> Option<SecretString> {
    GEMINI_API_KEY
        .get_or_init(|| {
            std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::from)
        })
        .clone()
}

pub const MAX_RESPONSE_SIZE: usize = 2 * 1024 * 1024; // 2MB

const MAX_RETRIES: u32 = 3;
const MAX_COLLISIONS: u64 = 20; // Safety valve for rate limiter collision loop
const RATE_LIMIT_TIMEOUT: Duration = Duration::from_secs(5);

// Monotonic clock so NTP corrections or VM resume cannot stall the limiter
static START_INSTANT: OnceLock<Instant> = OnceLock::new();

fn monotonic_ms() -> u64 {
    let start = START_INSTANT.get_or_init(Instant::now);
    start.elapsed().as_millis() as u64
}

// ============================================================================
// Wire Format
// ============================================================================

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ============================================================================
// Rate Limiter
// ============================================================================

/// Enforces a minimum spacing between request starts across all clones of
/// one client.
#[derive(Debug)]
struct RateLimiter {
    last_request_ms: AtomicU64,
    min_interval_ms: u64,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request_ms: AtomicU64::new(0),
            min_interval_ms,
        }
    }

    /// Wait for and claim the next request slot.
    async fn acquire(&self) {
        if self.min_interval_ms == 0 {
            return;
        }

        let mut collision_count: u64 = 0;
        let started = Instant::now();
        loop {
            if started.elapsed() > RATE_LIMIT_TIMEOUT {
                tracing::debug!(
                    elapsed_ms = started.elapsed().as_millis(),
                    collisions = collision_count,
                    "Rate limiter timeout budget exceeded, proceeding"
                );
                break;
            }

            let now = monotonic_ms();
            let last = self.last_request_ms.load(Ordering::Acquire);
            // A zero slot means no request has been made yet
            let next_allowed = if last == 0 {
                0
            } else {
                last.saturating_add(self.min_interval_ms)
            };

            if now >= next_allowed {
                // Claim the slot atomically; `max(1)` keeps the first claim distinguishable
                match self.last_request_ms.compare_exchange(
                    last,
                    now.max(1),
                    Ordering::Release,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => break,
                    Err(_) => {
                        collision_count += 1;
                        if collision_count >= MAX_COLLISIONS {
                            tracing::warn!(
                                collisions = collision_count,
                                "Rate limiter max collisions reached, proceeding without slot"
                            );
                            break;
                        }
                        if collision_count > 1 {
                            let backoff_us = 100 * (1u64 << collision_count.min(6));
                            tokio::time::sleep(Duration::from_micros(backoff_us)).await;
                        }
                    }
                }
            } else {
                let wait_ms = next_allowed.saturating_sub(now).max(1);
                tokio::time::sleep(Duration::from_millis(wait_ms)).await;
            }
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Thin client for the Gemini `generateContent` endpoint.
///
/// Cloning is cheap; clones share the HTTP connection pool and the rate
/// limiter.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    timeout: Duration,
    retry_base_delay: Duration,
    limiter: Arc<RateLimiter>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiClient {
    /// Build a client from config. `GEMINI_API_KEY` in the environment wins
    /// over the config file key.
    ///
    /// A missing key is not an error here: cached responses remain usable
    /// and the first request that actually reaches the API reports
    /// `AiError::MissingApiKey`.
    pub fn from_config(http: reqwest::Client, config: &Config) -> Result<Self, AiError> {
        let api_key = env_api_key().or_else(|| {
            config
                .gemini_api_key
                .as_deref()
                .filter(|k| !k.trim().is_empty())
                .map(|k| SecretString::from(k.to_string()))
        });

        let client = Self::new(http, &config.gemini_base_url, api_key)?
            .with_timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .with_min_interval(config.min_request_interval_ms);

        if config.gemini_base_url != Config::default().gemini_base_url {
            tracing::info!(base_url = %client.base_url, "Using custom Gemini API base URL");
        }
        Ok(client)
    }

    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        api_key: Option<SecretString>,
    ) -> Result<Self, AiError> {
        let base_url = validate_base_url(base_url).inspect_err(|e| {
            tracing::error!(base_url = %base_url, error = %e, "Rejecting Gemini base URL");
        })?;

        Ok(Self {
            http,
            base_url,
            api_key,
            timeout: Duration::from_secs(30),
            retry_base_delay: Duration::from_secs(1),
            limiter: Arc::new(RateLimiter::new(250)),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_interval(mut self, min_interval_ms: u64) -> Self {
        self.limiter = Arc::new(RateLimiter::new(min_interval_ms));
        self
    }

    /// First retry delay; later retries double it.
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send `prompt` to `model` and return the raw generated text.
    ///
    /// Transient failures (timeouts, network errors, 429 and 5xx) are
    /// retried with exponential backoff: 1s, 2s, 4s (max 3 retries).
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, AiError> {
        let api_key = self.api_key.as_ref().ok_or(AiError::MissingApiKey)?;
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let body = serde_json::to_vec(&GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        })?;

        let mut retry_count = 0;
        loop {
            self.limiter.acquire().await;
            match self.send_once(&url, api_key, &body).await {
                Ok(text) => {
                    tracing::debug!(model = %model, response_len = text.len(), "Generation complete");
                    return Ok(text);
                }
                Err(e) if e.is_retryable() && retry_count < MAX_RETRIES => {
                    let delay = self.retry_base_delay * (1u32 << retry_count);
                    tracing::debug!(
                        error = %e,
                        model = %model,
                        retry = retry_count + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying generation after transient error"
                    );
                    tokio::time::sleep(delay).await;
                    retry_count += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, model = %model, "Generation failed");
                    return Err(e);
                }
            }
        }
    }

    async fn send_once(
        &self,
        url: &str,
        api_key: &SecretString,
        body: &[u8],
    ) -> Result<String, AiError> {
        let request = self
            .http
            .post(url)
            .header("x-goog-api-key", api_key.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_vec());

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| AiError::Timeout(self.timeout.as_secs()))?
            .map_err(AiError::Network)?;

        if !response.status().is_success() {
            return Err(AiError::HttpStatus(response.status().as_u16()));
        }

        let raw = tokio::time::timeout(
            self.timeout,
            read_limited_text(response, MAX_RESPONSE_SIZE),
        )
        .await
        .map_err(|_| AiError::Timeout(self.timeout.as_secs()))??;

        let parsed: GenerateResponse = serde_json::from_str(&raw)?;
        parsed.into_text().ok_or(AiError::EmptyResponse)
    }
}

async fn read_limited_text(response: reqwest::Response, limit: usize) -> Result<String, AiError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(AiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(AiError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(AiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes).map_err(|_| AiError::InvalidUtf8)
}
