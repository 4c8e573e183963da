//! Highlight summaries from a generative text service.
//!
//! # Architecture
//!
//! - [`TextGenerator`]: Core trait for "prompt in, completion out" backends
//! - [`GeminiClient`]: The Google Gemini `generateContent` REST endpoint
//! - [`Summarizer`]: Builds the prompt, tidies the completion and falls back
//!   to the article's lead text whenever the backend fails
//!
//! The backend is best-effort. A failed call is never surfaced to callers;
//! the fallback text has the same shape as a real summary.

use crate::models::LeadText;
use crate::utils::{truncate_for_log, truncate_with_ellipsis};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Maximum summary length, in characters, before truncation.
pub const MAX_SUMMARY_CHARS: usize = 150;

/// Text used when neither the service nor the lead text yields anything.
pub const NO_SUMMARY: &str = "No summary available.";

/// Default REST root of the Gemini API.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gemini model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

const GEMINI_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures of the text generation backend.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summary request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("summary service returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("summary service returned no text")]
    Empty,
}

/// Trait for async text generation.
///
/// Implementors send a free-text prompt to some model and return its
/// completion.
pub trait TextGenerator {
    /// Send `prompt` and return the raw completion text.
    async fn generate(&self, prompt: &str) -> Result<String, SummaryError>;
}

/// Client for the Gemini `models/{model}:generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
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
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            urlencoding::encode(&self.api_key)
        )
    }
}

impl TextGenerator for GeminiClient {
    #[instrument(level = "debug", skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String, SummaryError> {
        let t0 = Instant::now();
        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(self.endpoint())
            .timeout(GEMINI_TIMEOUT)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummaryError::Status {
                status,
                body: truncate_for_log(&body, 300),
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or(SummaryError::Empty)?;

        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, chars = text.chars().count(), "Gemini completion received");
        Ok(text)
    }
}

/// Build the instruction sent to the text generator.
pub fn build_prompt(title: &str, lead_text: &str, source: &str) -> String {
    format!(
        "Generate a 1-2 sentence summary of this tech news article.\n\
         Title: {title}\n\
         Content: {lead_text}\n\
         Source: {source}\n\
         \n\
         Make the summary engaging and highlight the key points. Focus on the impact and significance.\n\
         Keep it under {MAX_SUMMARY_CHARS} characters."
    )
}

/// The summary used when the generator cannot provide one.
///
/// ```ignore
/// assert_eq!(fallback_summary(""), "No summary available.");
/// ```
pub fn fallback_summary(lead_text: &str) -> String {
    if lead_text.is_empty() {
        NO_SUMMARY.to_string()
    } else {
        truncate_with_ellipsis(lead_text, MAX_SUMMARY_CHARS)
    }
}

/// Turns article details into a short highlight via a [`TextGenerator`].
#[derive(Debug)]
pub struct Summarizer<G> {
    generator: G,
}

impl<G: TextGenerator> Summarizer<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Summarize an article in at most [`MAX_SUMMARY_CHARS`] characters (plus ellipsis).
    ///
    /// When the article page was unavailable the generator is not called at
    /// all. Any generator failure yields [`fallback_summary`] of the lead.
    #[instrument(level = "info", skip_all, fields(%source))]
    pub async fn summarize(&self, title: &str, lead: &LeadText, source: &str) -> String {
        let lead_text = match lead {
            LeadText::Fetched(text) => text.as_str(),
            LeadText::Unavailable => {
                debug!("Article page unavailable; skipping summary generation");
                return fallback_summary("");
            }
        };

        let prompt = build_prompt(title, lead_text, source);
        match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => truncate_with_ellipsis(text.trim(), MAX_SUMMARY_CHARS),
            Ok(_) => {
                warn!(title = %truncate_for_log(title, 50), "Summary service returned blank text; using lead text");
                fallback_summary(lead_text)
            }
            Err(e) => {
                warn!(title = %truncate_for_log(title, 50), error = %e, "Error generating summary; using lead text");
                fallback_summary(lead_text)
            }
        }
    }
}
