//! The registry of news sites the digest is built from.
//!
//! # Supported Sources
//!
//! | Source | Category |
//! |--------|----------|
//! | TechCrunch | Startup & Business |
//! | The Verge | General Tech |
//! | Ars Technica | In-Depth Tech |
//! | TechRadar | Hardware & Reviews |
//! | Hacker News | Developer News |
//! | MIT Technology Review | AI & Research |
//! | The Next Web | AI & Future Tech |
//! | VentureBeat | AI & Business |
//!
//! The built-in list can be replaced wholesale by a YAML file (see
//! [`load_sources`]). Selector lists deliberately keep alternates that may no
//! longer match; see [`crate::selectors`] for how they are resolved.

use crate::models::{FieldSelectors, SourceDescriptor};
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument};

/// Failure to load a source override file.
#[derive(Debug, Error)]
pub enum SourcesError {
    #[error("cannot read sources file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse sources file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("sources file {0} defines no sources")]
    Empty(String),
}

fn source(name: &str, url: &str, article: &[&str], title: &[&str], link: &[&str], category: &str) -> SourceDescriptor {
    let owned = |patterns: &[&str]| -> Vec<String> { patterns.iter().map(|p| p.to_string()).collect() };
    SourceDescriptor {
        name: name.to_string(),
        url: url.to_string(),
        selectors: FieldSelectors {
            article: owned(article),
            title: owned(title),
            link: owned(link),
        },
        category: category.to_string(),
    }
}

/// The eight built-in technology news sources, in processing order.
pub fn default_sources() -> Vec<SourceDescriptor> {
    vec![
        source(
            "TechCrunch",
            "https://techcrunch.com",
            &["article.post-block", "div.post-block"],
            &["h2.post-block__title", "h2 a", "h2"],
            &["a.post-block__title__link", "h2 a", "a"],
            "Startup & Business",
        ),
        source(
            "The Verge",
            "https://www.theverge.com/tech",
            &["div.duet--content-cards--content-card", "article"],
            &["h2", "h3"],
            &["a"],
            "General Tech",
        ),
        source(
            "Ars Technica",
            "https://arstechnica.com/gadgets/",
            &["article", "div.article"],
            &["h2", "header h2"],
            &["a"],
            "In-Depth Tech",
        ),
        source(
            "TechRadar",
            "https://www.techradar.com/news/computing",
            &["div.article-container", "article"],
            &["h3", "h2"],
            &["a"],
            "Hardware & Reviews",
        ),
        source(
            "Hacker News",
            "https://news.ycombinator.com",
            &["span.titleline"],
            &["a"],
            &["a"],
            "Developer News",
        ),
        source(
            "MIT Technology Review",
            "https://www.technologyreview.com/topic/artificial-intelligence/",
            &["div.card--card", "article"],
            &["h3", "h2"],
            &["a"],
            "AI & Research",
        ),
        source(
            "The Next Web",
            "https://thenextweb.com/neural",
            &["article", "div.story"],
            &["h2", "h3"],
            &["a"],
            "AI & Future Tech",
        ),
        source(
            "VentureBeat",
            "https://venturebeat.com/ai/",
            &["article.Article", "article"],
            &["h2", "h3"],
            &["a"],
            "AI & Business",
        ),
    ]
}

/// Load sources from a YAML override file, or the built-in list when `path` is `None`.
///
/// # Errors
///
/// Returns a [`SourcesError`] if the file cannot be read, is not a YAML list
/// of source descriptors, or is empty.
#[instrument(level = "info")]
pub fn load_sources(path: Option<&Path>) -> Result<Vec<SourceDescriptor>, SourcesError> {
    let Some(path) = path else {
        return Ok(default_sources());
    };
    let shown = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| SourcesError::Read {
        path: shown.clone(),
        source,
    })?;
    let sources: Vec<SourceDescriptor> =
        serde_yaml::from_str(&raw).map_err(|source| SourcesError::Parse {
            path: shown.clone(),
            source,
        })?;
    if sources.is_empty() {
        return Err(SourcesError::Empty(shown));
    }
    info!(count = sources.len(), path = %path.display(), "Loaded source overrides");
    Ok(sources)
}
