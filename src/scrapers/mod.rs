//! Article extraction for configured news sources.
//!
//! Each source is processed in two phases:
//!
//! 1. **Discovery** ([`homepage`]): fetch the homepage, locate up to three
//!    article blocks and pull a title and absolute link out of each
//! 2. **Enrichment** ([`article`]): fetch every article page for a lead
//!    description, then ask the [`Summarizer`] for a highlight
//!
//! Failures stay local: a block without a title or link is skipped, an
//! unreachable article page yields an empty lead, and an unreachable homepage
//! turns the whole source into [`SourceOutcome::Failed`]. Nothing here ever
//! aborts the run.

pub mod article;
pub mod homepage;

use crate::api::{Summarizer, TextGenerator};
use crate::fetcher::{FetchError, HOMEPAGE_TIMEOUT, PageFetcher, Throttle, browser_headers};
use crate::models::{ArticleRecord, SourceDescriptor};
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use homepage::{BlockOutcome, Candidate};
use tracing::{error, info, instrument};

/// What processing one source produced.
#[derive(Debug)]
pub enum SourceOutcome {
    /// The homepage was fetched; `skipped` counts blocks without title or link.
    Scraped {
        articles: Vec<ArticleRecord>,
        skipped: usize,
    },
    /// The homepage could not be fetched.
    Failed(FetchError),
}

/// Scrape one source end to end.
///
/// Waits the randomized courtesy delay, then processes the article blocks
/// strictly one after another.
#[instrument(level = "info", skip_all, fields(source = %source.name))]
pub async fn scrape_source<G: TextGenerator>(
    source: &SourceDescriptor,
    fetcher: &PageFetcher,
    summarizer: &Summarizer<G>,
    throttle: &Throttle,
) -> SourceOutcome {
    info!(url = %source.url, "Attempting to scrape source");
    throttle.before_homepage().await;

    let page = match fetcher
        .fetch(&source.url, &browser_headers(), HOMEPAGE_TIMEOUT)
        .await
    {
        Ok(page) => page,
        Err(e) => {
            error!(error = %e, "Error scraping source homepage");
            return SourceOutcome::Failed(e);
        }
    };
    info!(status = %page.status, final_url = %page.url, bytes = page.body.len(), "Fetched homepage");

    let outcomes = homepage::discover_candidates(&page.body, source);
    let mut skipped = 0usize;
    let mut candidates = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            BlockOutcome::Found(candidate) => candidates.push(candidate),
            BlockOutcome::Skipped(_) => skipped += 1,
        }
    }

    let articles: Vec<ArticleRecord> = stream::iter(candidates)
        .then(|candidate| build_record(candidate, source, fetcher, summarizer))
        .collect()
        .await;

    info!(count = articles.len(), skipped, "Finished source");
    SourceOutcome::Scraped { articles, skipped }
}

async fn build_record<G: TextGenerator>(
    candidate: Candidate,
    source: &SourceDescriptor,
    fetcher: &PageFetcher,
    summarizer: &Summarizer<G>,
) -> ArticleRecord {
    let lead = article::fetch_lead(fetcher, &candidate.link).await;
    let ai_summary = summarizer
        .summarize(&candidate.title, &lead, &source.name)
        .await;

    info!(title = %truncate_for_log(&candidate.title, 50), "Successfully processed article");
    ArticleRecord {
        title: candidate.title,
        link: candidate.link,
        source: source.name.clone(),
        lead_text: lead.as_str().to_string(),
        ai_summary,
        category: source.category.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{Canned, Unreachable};
    use crate::api::NO_SUMMARY;
    use crate::fetcher::RetryPolicy;
    use crate::models::FieldSelectors;
    use reqwest::Client;
    use std::time::Duration;

    fn fetcher() -> PageFetcher {
        PageFetcher::new(
            Client::new(),
            RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::ZERO,
            },
        )
    }

    fn descriptor(url: String) -> SourceDescriptor {
        SourceDescriptor {
            name: "Mock News".into(),
            url,
            selectors: FieldSelectors {
                article: vec!["article.story".into(), "article".into()],
                title: vec!["h2".into()],
                link: vec!["a".into()],
            },
            category: "General Tech".into(),
        }
    }

    const HOMEPAGE: &str = r#"
        <html><body>
          <article class="story"><h2>Alpha launches</h2><a href="/a1">more</a></article>
          <article class="story"><h2>Beta ships</h2><a href="/a2">more</a></article>
          <article class="story"><h2>Gamma fails</h2><a href="/a3">more</a></article>
          <article class="story"><h2>Delta ignored</h2><a href="/a4">more</a></article>
        </body></html>
    "#;

    #[tokio::test]
    async fn test_scrape_source_isolates_article_failures() {
        let mut server = mockito::Server::new_async().await;
        let _home = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(HOMEPAGE)
            .create_async()
            .await;
        let _a1 = server
            .mock("GET", "/a1")
            .with_status(200)
            .with_body(r#"<head><meta name="description" content="Alpha lead."></head>"#)
            .create_async()
            .await;
        let _a2 = server
            .mock("GET", "/a2")
            .with_status(200)
            .with_body("<body><p>Beta lead.</p></body>")
            .create_async()
            .await;
        let _a3 = server
            .mock("GET", "/a3")
            .with_status(404)
            .create_async()
            .await;
        let a4 = server.mock("GET", "/a4").expect(0).create_async().await;

        let source = descriptor(server.url());
        let summarizer = Summarizer::new(Unreachable);
        let outcome = scrape_source(&source, &fetcher(), &summarizer, &Throttle::none()).await;

        let SourceOutcome::Scraped { articles, skipped } = outcome else {
            panic!("source unexpectedly failed");
        };
        assert_eq!(skipped, 0);
        assert_eq!(articles.len(), 3);

        assert_eq!(articles[0].title, "Alpha launches");
        assert_eq!(articles[0].link, format!("{}/a1", server.url()));
        assert_eq!(articles[0].lead_text, "Alpha lead.");
        assert_eq!(articles[0].ai_summary, "Alpha lead.");
        assert_eq!(articles[1].lead_text, "Beta lead.");

        assert_eq!(articles[2].title, "Gamma fails");
        assert_eq!(articles[2].lead_text, "");
        assert_eq!(articles[2].ai_summary, NO_SUMMARY);

        for article in &articles {
            assert_eq!(article.source, "Mock News");
            assert_eq!(article.category, "General Tech");
        }
        a4.assert_async().await;
    }

    #[tokio::test]
    async fn test_scrape_source_uses_generated_summary() {
        let mut server = mockito::Server::new_async().await;
        let _home = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(r#"<article><h2>Only</h2><a href="/only">x</a></article>"#)
            .create_async()
            .await;
        let _page = server
            .mock("GET", "/only")
            .with_status(200)
            .with_body("<p>Lead.</p>")
            .create_async()
            .await;

        let source = descriptor(server.url());
        let summarizer = Summarizer::new(Canned("Generated highlight.".into()));
        let outcome = scrape_source(&source, &fetcher(), &summarizer, &Throttle::none()).await;

        let SourceOutcome::Scraped { articles, .. } = outcome else {
            panic!("source unexpectedly failed");
        };
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].ai_summary, "Generated highlight.");
        assert_eq!(articles[0].lead_text, "Lead.");
    }

    #[tokio::test]
    async fn test_scrape_source_without_matching_blocks_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _home = server
            .mock("GET", "/")
            .with_status(200)
            .with_body("<div>redesigned page</div>")
            .create_async()
            .await;

        let source = descriptor(server.url());
        let outcome = scrape_source(&source, &fetcher(), &Summarizer::new(Unreachable), &Throttle::none()).await;

        assert!(matches!(outcome, SourceOutcome::Scraped { ref articles, skipped: 0 } if articles.is_empty()));
    }

    #[tokio::test]
    async fn test_scrape_source_homepage_failure() {
        let mut server = mockito::Server::new_async().await;
        let _home = server
            .mock("GET", "/")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let source = descriptor(server.url());
        let outcome = scrape_source(&source, &fetcher(), &Summarizer::new(Unreachable), &Throttle::none()).await;

        assert!(matches!(outcome, SourceOutcome::Failed(FetchError::Status { .. })));
    }
}
