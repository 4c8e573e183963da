//! # Tech News Digest
//!
//! Scrapes the latest headlines from a fixed list of technology news sites,
//! asks Gemini for a one or two sentence highlight of each, and mails a single
//! categorized HTML digest through the local mail client.
//!
//! ## Usage
//!
//! ```sh
//! GOOGLE_API_KEY=... RECIPIENT_EMAIL=me@example.com tech_news_digest
//! ```
//!
//! ## Architecture
//!
//! The application is a linear, strictly sequential pipeline:
//! 1. **Discovery**: Fetch each source homepage and locate up to three article blocks
//! 2. **Enrichment**: Fetch each article page for a lead description
//! 3. **Summarizing**: Ask the summary service for a short highlight (with fallback)
//! 4. **Delivery**: Group by category, render HTML and hand it to `sendmail`
//!
//! Sources are processed one at a time with courtesy delays in between;
//! failures never escalate past the source or article they occurred in.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod fetcher;
mod mail;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod selectors;
mod sources;
mod utils;

use api::{GeminiClient, Summarizer};
use cli::{Cli, ConfigError};
use fetcher::{PageFetcher, RetryPolicy, Throttle};
use mail::SendmailMailer;
use pipeline::{Delivery, collect_articles, deliver_digest};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("tech_news_digest starting up");

    // --- Configuration (fatal on error, before any network activity) ---
    if let Err(e) = dotenvy::dotenv() {
        debug!(error = %e, "No .env file loaded");
    }
    let args = Cli::parse();
    debug!(?args, "Parsed configuration");

    let credentials = args.credentials().inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;
    let sources = sources::load_sources(args.sources_file.as_deref())
        .map_err(ConfigError::from)
        .inspect_err(|e| error!(error = %e, "Invalid configuration"))?;
    info!(count = sources.len(), "Loaded news sources");

    // --- Shared clients ---
    let http = reqwest::Client::builder().build()?;
    let fetcher = PageFetcher::new(http.clone(), RetryPolicy::default());
    let summarizer = Summarizer::new(GeminiClient::new(
        http,
        &args.gemini_base_url,
        &args.gemini_model,
        &credentials.google_api_key,
    ));
    let mailer = SendmailMailer::new(&args.sendmail_path);

    // --- Scrape ---
    info!("Starting news scraping");
    let (all_news, report) =
        collect_articles(&sources, &fetcher, &summarizer, &Throttle::default()).await;
    info!(
        sources = report.sources_attempted,
        failed_sources = report.sources_failed,
        skipped_blocks = report.blocks_skipped,
        articles = report.articles,
        "Found total news items"
    );

    // --- Compose & deliver ---
    let delivery = deliver_digest(
        &all_news,
        &mailer,
        &credentials.recipient_email,
        args.digest_from.as_deref(),
        Local::now(),
    )
    .await;

    let elapsed = start_time.elapsed();
    match delivery {
        Delivery::Sent => info!(?elapsed, articles = all_news.len(), "Execution complete"),
        Delivery::NothingToSend => info!(?elapsed, "Execution complete; nothing to send"),
        Delivery::Failed(e) => info!(
            ?elapsed,
            articles = all_news.len(),
            error = %e,
            "Execution complete; digest was not delivered"
        ),
    }

    Ok(())
}
