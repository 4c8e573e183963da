//! Run orchestration: scrape every source in turn, then compose and deliver.

use crate::api::{Summarizer, TextGenerator};
use crate::fetcher::{PageFetcher, Throttle};
use crate::mail::{Email, MailError, Mailer};
use crate::models::{ArticleRecord, SourceDescriptor};
use crate::outputs::html::DigestDocument;
use crate::scrapers::{SourceOutcome, scrape_source};
use chrono::{DateTime, Local};
use tracing::{error, info, instrument, warn};

/// Aggregate counters for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub sources_attempted: usize,
    pub sources_failed: usize,
    pub blocks_skipped: usize,
    pub articles: usize,
}

/// Result of the delivery step.
#[derive(Debug)]
pub enum Delivery {
    Sent,
    NothingToSend,
    Failed(MailError),
}

/// Scrape all `sources` sequentially and collect their articles in order.
///
/// A failed source is counted and logged; the run always moves on to the
/// next one.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn collect_articles<G: TextGenerator>(
    sources: &[SourceDescriptor],
    fetcher: &PageFetcher,
    summarizer: &Summarizer<G>,
    throttle: &Throttle,
) -> (Vec<ArticleRecord>, RunReport) {
    let mut all_news = Vec::new();
    let mut report = RunReport::default();

    for (i, source) in sources.iter().enumerate() {
        if i > 0 {
            throttle.between_sources().await;
        }
        report.sources_attempted += 1;

        match scrape_source(source, fetcher, summarizer, throttle).await {
            SourceOutcome::Scraped { articles, skipped } => {
                info!(source = %source.name, count = articles.len(), "Found articles");
                report.blocks_skipped += skipped;
                all_news.extend(articles);
            }
            SourceOutcome::Failed(e) => {
                warn!(source = %source.name, url = %e.url(), error = %e, "Skipping source");
                report.sources_failed += 1;
            }
        }
    }

    report.articles = all_news.len();
    (all_news, report)
}

/// Compose the digest for `articles` and hand it to `mailer`.
///
/// Nothing is sent for an empty article list. Delivery failures are logged
/// and returned, never propagated as errors.
#[instrument(level = "info", skip_all, fields(articles = articles.len()))]
pub async fn deliver_digest<M: Mailer>(
    articles: &[ArticleRecord],
    mailer: &M,
    recipient: &str,
    from: Option<&str>,
    now: DateTime<Local>,
) -> Delivery {
    if articles.is_empty() {
        warn!("No news items found");
        return Delivery::NothingToSend;
    }

    let digest = DigestDocument::new(articles, now);
    let email = Email {
        to: recipient.to_string(),
        from: from.map(str::to_string),
        subject: digest.subject(),
        html_body: digest.render(),
    };

    info!(total = articles.len(), categories = digest.categories.len(), "Sending digest");
    match mailer.send(&email).await {
        Ok(()) => {
            info!(subject = %email.subject, "Email sent successfully");
            Delivery::Sent
        }
        Err(e) => {
            error!(error = %e, "Error sending email");
            Delivery::Failed(e)
        }
    }
}
