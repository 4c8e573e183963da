//! Data models for news sources and the articles scraped from them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SourceDescriptor`]: One configured news site and its extraction rules
//! - [`FieldSelectors`]: Ordered selector candidates for each extracted field
//! - [`LeadText`]: The short description pulled from an article page, if any
//! - [`ArticleRecord`]: A fully assembled article ready for the digest

use serde::Deserialize;

/// A configured news website together with its extraction rules.
///
/// Descriptors are built once at startup (from the built-in registry or an
/// override file) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceDescriptor {
    /// Display name used in logs and in the digest.
    pub name: String,
    /// Homepage URL; also the base for resolving relative links.
    pub url: String,
    /// Selector candidates per extracted field.
    pub selectors: FieldSelectors,
    /// Digest section this source's articles are listed under.
    pub category: String,
}

/// Ordered selector patterns for each field of an article block.
///
/// Every list is tried strictly in order; see [`crate::selectors`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldSelectors {
    /// Patterns locating the article blocks on the homepage.
    pub article: Vec<String>,
    /// Patterns locating the headline inside a block.
    pub title: Vec<String>,
    /// Patterns locating the anchor inside a block.
    pub link: Vec<String>,
}

/// The lead description taken from an article page.
///
/// `Unavailable` means the page itself could not be fetched; summary
/// generation is not attempted for such articles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadText {
    Fetched(String),
    Unavailable,
}

impl LeadText {
    /// The description text, empty when the page was unavailable.
    pub fn as_str(&self) -> &str {
        match self {
            LeadText::Fetched(text) => text,
            LeadText::Unavailable => "",
        }
    }
}

/// A scraped and summarized article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// Whitespace-normalized headline, at most 200 characters plus an ellipsis.
    pub title: String,
    /// Absolute article URL.
    pub link: String,
    /// Name of the source the article was found on.
    pub source: String,
    /// Meta description or first paragraph of the article page.
    pub lead_text: String,
    /// Generated highlight summary (or its fallback).
    pub ai_summary: String,
    /// Category copied from the source descriptor.
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_text_as_str() {
        assert_eq!(LeadText::Fetched("Lead".to_string()).as_str(), "Lead");
        assert_eq!(LeadText::Unavailable.as_str(), "");
    }

    #[test]
    fn test_source_descriptor_deserialization() {
        let yaml = r#"
name: Example
url: https://example.com
category: General Tech
selectors:
  article: [article, div.story]
  title: [h2]
  link: [a]
"#;
        let source: SourceDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(source.name, "Example");
        assert_eq!(source.selectors.article, vec!["article", "div.story"]);
        assert_eq!(source.selectors.title, vec!["h2"]);
        assert_eq!(source.category, "General Tech");
    }
}
