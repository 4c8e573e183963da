//! Command-line and environment configuration.
//!
//! Everything the run needs comes from [`Cli`]; missing credentials are
//! reported as a [`ConfigError`] before any request is made.

use crate::api::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration for the Tech News Digest run.
///
/// Every option is read from the environment (a `.env` file in the working
/// directory is loaded first); the long flags only exist as overrides.
///
/// # Examples
///
/// ```sh
/// # Normal usage: everything comes from the environment
/// GOOGLE_API_KEY=... RECIPIENT_EMAIL=me@example.com tech_news_digest
///
/// # Use a custom source list and mail program
/// NEWS_SOURCES_FILE=./sources.yaml SENDMAIL_PATH=/usr/sbin/sendmail tech_news_digest
/// ```
#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// API key for the Gemini summary service
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// Address the digest is sent to
    #[arg(long, env = "RECIPIENT_EMAIL")]
    pub recipient_email: Option<String>,

    /// Gemini model used for summaries
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    /// Root URL of the Gemini REST API
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    pub gemini_base_url: String,

    /// sendmail-compatible program used to deliver the digest
    #[arg(long, env = "SENDMAIL_PATH", default_value = "sendmail")]
    pub sendmail_path: String,

    /// Optional From address for the digest
    #[arg(long, env = "DIGEST_FROM")]
    pub digest_from: Option<String>,

    /// Optional YAML file replacing the built-in news sources
    #[arg(long, env = "NEWS_SOURCES_FILE")]
    pub sources_file: Option<PathBuf>,
}

impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("google_api_key", &self.google_api_key.as_ref().map(|_| "<redacted>"))
            .field("recipient_email", &self.recipient_email)
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("sendmail_path", &self.sendmail_path)
            .field("digest_from", &self.digest_from)
            .field("sources_file", &self.sources_file)
            .finish()
    }
}

/// Fatal configuration problems, detected before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set (environment or .env file)")]
    Missing(&'static str),
    #[error(transparent)]
    Sources(#[from] crate::sources::SourcesError),
}

/// The two credentials every run needs.
#[derive(Clone)]
pub struct Credentials {
    pub google_api_key: String,
    pub recipient_email: String,
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::Missing(name))
}

impl Cli {
    /// Check that the required credentials are present and non-blank.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        Ok(Credentials {
            google_api_key: required(&self.google_api_key, "GOOGLE_API_KEY")?,
            recipient_email: required(&self.recipient_email, "RECIPIENT_EMAIL")?,
        })
    }
}
