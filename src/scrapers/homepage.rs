//! Candidate discovery on a source homepage.
//!
//! A homepage is parsed once, up to [`DEFAULT_FIND_LIMIT`] article blocks are
//! located, and each block is reduced to an owned [`Candidate`] (clean title
//! plus absolute link) before any further network activity happens.

use crate::models::SourceDescriptor;
use crate::selectors::{DEFAULT_FIND_LIMIT, find_all, find_first};
use crate::utils::clean_text;
use scraper::{ElementRef, Html};
use tracing::{debug, info};
use url::Url;

/// A headline and link pulled out of one article block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub link: String,
}

/// Why an article block produced no candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoTitle,
    NoLink,
}

/// Result of examining one article block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    Found(Candidate),
    Skipped(SkipReason),
}

/// Parse `html` and extract a candidate from each article block.
///
/// An empty result means no article pattern matched at all.
pub fn discover_candidates(html: &str, source: &SourceDescriptor) -> Vec<BlockOutcome> {
    let document = Html::parse_document(html);
    let blocks = find_all(document.root_element(), &source.selectors.article, DEFAULT_FIND_LIMIT);
    info!(source = %source.name, count = blocks.len(), "Found potential articles");

    blocks
        .into_iter()
        .map(|block| match extract_block(block, source) {
            Ok(candidate) => BlockOutcome::Found(candidate),
            Err(reason) => {
                debug!(source = %source.name, ?reason, "Skipping article block");
                BlockOutcome::Skipped(reason)
            }
        })
        .collect()
}

fn extract_block(block: ElementRef<'_>, source: &SourceDescriptor) -> Result<Candidate, SkipReason> {
    let title = find_first(block, &source.selectors.title)
        .map(|element| clean_text(&element.text().collect::<String>()))
        .filter(|title| !title.is_empty())
        .ok_or(SkipReason::NoTitle)?;

    let href = source
        .selectors
        .link
        .iter()
        .filter_map(|pattern| find_first(block, std::slice::from_ref(pattern)))
        .find_map(|element| {
            element
                .value()
                .attr("href")
                .map(str::trim)
                .filter(|href| !href.is_empty())
        })
        .ok_or(SkipReason::NoLink)?;

    Ok(Candidate {
        title,
        link: normalize_link(href, &source.url),
    })
}

/// Resolve a scraped `href` against the source's configured base URL.
///
/// Rules, in priority order:
/// 1. `//host/path` gets an `https:` prefix
/// 2. `/path` is appended to the scheme and host of `base_url`
/// 3. anything not starting with `http` is joined to `base_url` with exactly
///    one `/` between them
/// 4. everything else passes through unchanged
///
/// ```ignore
/// assert_eq!(normalize_link("/a/b", "https://site.com/tech"), "https://site.com/a/b");
/// ```
pub fn normalize_link(raw: &str, base_url: &str) -> String {
    if raw.starts_with("//") {
        format!("https:{raw}")
    } else if raw.starts_with('/') {
        format!("{}{}", origin_of(base_url), raw)
    } else if !raw.starts_with("http") {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            raw.trim_start_matches('/')
        )
    } else {
        raw.to_string()
    }
}

/// `scheme://host[:port]` of `base_url`.
fn origin_of(base_url: &str) -> String {
    match Url::parse(base_url) {
        Ok(url) if url.has_host() => url.origin().ascii_serialization(),
        _ => base_url.trim_end_matches('/').to_string(),
    }
}
