//! Ordered-fallback element lookup over parsed HTML.
//!
//! News homepages change their markup constantly, so every extracted field is
//! described by a list of [`SelectorPattern`]s rather than a single selector.
//! Patterns are tried strictly in order and resolution commits to the first
//! pattern that matches anything inside the search scope. Matches from two
//! different patterns are never combined.
//!
//! # Pattern Syntax
//!
//! | Pattern | Meaning |
//! |---------|---------|
//! | `article` | any `<article>` element |
//! | `div.post-block` | a `<div>` whose class list contains `post-block` |
//!
//! Anything else (descendant chains such as `h2 a`, a second `.`, empty parts)
//! is malformed and treated as a non-match.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::trace;

/// Default number of elements returned by [`find_all`] in the pipeline.
pub const DEFAULT_FIND_LIMIT: usize = 3;

static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_-][A-Za-z0-9_-]*$").unwrap());

/// A parsed `tag` or `tag.class` pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorPattern {
    pub tag: String,
    pub class: Option<String>,
}

impl SelectorPattern {
    /// Parse a pattern string, returning `None` when it is malformed.
    ///
    /// ```ignore
    /// let p = SelectorPattern::parse("div.story").unwrap();
    /// assert_eq!(p.tag, "div");
    /// assert_eq!(p.class.as_deref(), Some("story"));
    /// assert!(SelectorPattern::parse("h2 a").is_none());
    /// ```
    pub fn parse(pattern: &str) -> Option<Self> {
        let (tag, class) = match pattern.split_once('.') {
            Some((tag, class)) => (tag, Some(class)),
            None => (pattern, None),
        };
        if !IDENT.is_match(tag) {
            return None;
        }
        if let Some(class) = class {
            if !IDENT.is_match(class) {
                return None;
            }
        }
        Some(Self {
            tag: tag.to_ascii_lowercase(),
            class: class.map(str::to_string),
        })
    }

    fn to_selector(&self) -> Option<Selector> {
        let css = match &self.class {
            Some(class) => format!("{}.{}", self.tag, class),
            None => self.tag.clone(),
        };
        Selector::parse(&css).ok()
    }
}

/// Every element under `scope` matching `pattern`, in document order.
///
/// The scope element itself is never part of the result.
fn select_within<'a>(scope: ElementRef<'a>, pattern: &str) -> Option<Vec<ElementRef<'a>>> {
    let selector = SelectorPattern::parse(pattern)?.to_selector()?;
    Some(
        scope
            .select(&selector)
            .filter(|element| element.id() != scope.id())
            .collect(),
    )
}

/// Return the first element matched by the first productive pattern.
///
/// Malformed patterns are skipped. `None` means every pattern came up empty,
/// which callers treat as "field absent".
pub fn find_first<'a, S: AsRef<str>>(scope: ElementRef<'a>, patterns: &[S]) -> Option<ElementRef<'a>> {
    patterns.iter().find_map(|pattern| {
        let pattern = pattern.as_ref();
        let found = select_within(scope, pattern)?.into_iter().next();
        trace!(pattern, hit = found.is_some(), "find_first");
        found
    })
}

/// Return up to `limit` elements matched by the first productive pattern.
///
/// Later patterns are consulted only while earlier ones match nothing; the
/// result never mixes elements from two patterns.
pub fn find_all<'a, S: AsRef<str>>(
    scope: ElementRef<'a>,
    patterns: &[S],
    limit: usize,
) -> Vec<ElementRef<'a>> {
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let Some(mut matches) = select_within(scope, pattern) else {
            trace!(pattern, "Skipping malformed selector pattern");
            continue;
        };
        if !matches.is_empty() {
            matches.truncate(limit);
            trace!(pattern, count = matches.len(), "find_all");
            return matches;
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const PAGE: &str = r#"
        <html><body>
          <div class="story lead"><h2>First</h2></div>
          <div class="story"><h2>Second</h2></div>
          <section><p>one</p><p>two</p><p>three</p><p>four</p></section>
        </body></html>
    "#;

    fn texts(elements: &[ElementRef<'_>]) -> Vec<String> {
        elements
            .iter()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .collect()
    }

    #[test]
    fn test_parse_patterns() {
        assert_eq!(
            SelectorPattern::parse("article"),
            Some(SelectorPattern { tag: "article".into(), class: None })
        );
        assert_eq!(
            SelectorPattern::parse("div.duet--content-cards--content-card"),
            Some(SelectorPattern {
                tag: "div".into(),
                class: Some("duet--content-cards--content-card".into())
            })
        );
        assert_eq!(SelectorPattern::parse("H2").unwrap().tag, "h2");
    }

    #[test]
    fn test_parse_rejects_malformed_patterns() {
        for bad in ["", "h2 a", "td.title a", "a.b.c", ".story", "div.", "1div", "div[x]"] {
            assert!(SelectorPattern::parse(bad).is_none(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_find_first_respects_pattern_order() {
        let doc = Html::parse_document(PAGE);
        let root = doc.root_element();
        let hit = find_first(root, &["p", "h2"]).unwrap();
        assert_eq!(hit.value().name(), "p");
        let hit = find_first(root, &["h3", "h2"]).unwrap();
        assert_eq!(hit.text().collect::<String>(), "First");
    }

    #[test]
    fn test_find_first_skips_malformed_and_misses() {
        let doc = Html::parse_document(PAGE);
        let root = doc.root_element();
        let hit = find_first(root, &["h2 a", "div.missing", "div.lead"]).unwrap();
        assert_eq!(texts(&[hit]), vec!["First"]);
        assert!(find_first(root, &["table", "h2 a"]).is_none());
        assert!(find_first::<&str>(root, &[]).is_none());
    }

    #[test]
    fn test_class_matches_any_member_of_class_list() {
        let doc = Html::parse_document(PAGE);
        let found = find_all(doc.root_element(), &["div.story"], 10);
        assert_eq!(texts(&found), vec!["First", "Second"]);
    }

    #[test]
    fn test_find_all_commits_to_first_productive_pattern() {
        let doc = Html::parse_document(PAGE);
        let found = find_all(doc.root_element(), &["article", "div.story", "p"], 10);
        assert_eq!(texts(&found), vec!["First", "Second"]);
    }

    #[test]
    fn test_find_all_caps_results() {
        let doc = Html::parse_document(PAGE);
        let found = find_all(doc.root_element(), &["p"], DEFAULT_FIND_LIMIT);
        assert_eq!(texts(&found), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_find_all_exhausted_is_empty() {
        let doc = Html::parse_document(PAGE);
        assert!(find_all(doc.root_element(), &["article", "h2 a", "div.post"], 3).is_empty());
    }

    #[test]
    fn test_scoped_search_excludes_scope_element() {
        let doc = Html::parse_document(PAGE);
        let block = find_first(doc.root_element(), &["div.story"]).unwrap();
        assert!(find_first(block, &["div"]).is_none());
        assert_eq!(texts(&[find_first(block, &["h2"]).unwrap()]), vec!["First"]);
    }
}
