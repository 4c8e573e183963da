//! Lead description extraction from individual article pages.

use crate::fetcher::{ARTICLE_TIMEOUT, PageFetcher, browser_headers};
use crate::models::LeadText;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};

static META_DESCRIPTION: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"meta[name="description"], meta[name="og:description"], meta[name="twitter:description"]"#,
    )
    .unwrap()
});

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Pull a short description out of an article page.
///
/// The first recognized description `<meta>` tag wins; when it is missing or
/// blank, the text of the first `<p>` is used. Returns an empty string when
/// neither is present.
pub fn extract_lead(html: &str) -> String {
    let document = Html::parse_document(html);

    let meta = document
        .select(&META_DESCRIPTION)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(str::trim)
        .unwrap_or_default();
    if !meta.is_empty() {
        return meta.to_string();
    }

    document
        .select(&PARAGRAPH)
        .next()
        .map(|p| p.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Fetch an article page and extract its lead description.
///
/// Any fetch failure is logged and reported as [`LeadText::Unavailable`].
#[instrument(level = "info", skip(fetcher))]
pub async fn fetch_lead(fetcher: &PageFetcher, url: &str) -> LeadText {
    match fetcher.fetch(url, &browser_headers(), ARTICLE_TIMEOUT).await {
        Ok(page) => {
            let lead = extract_lead(&page.body);
            debug!(chars = lead.chars().count(), "Extracted lead description");
            LeadText::Fetched(lead)
        }
        Err(e) => {
            warn!(error = %e, "Error getting article page");
            LeadText::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_description_preferred() {
        let html = r#"
            <html><head><meta name="description" content=" Meta lead. "></head>
            <body><p>Paragraph lead.</p></body></html>
        "#;
        assert_eq!(extract_lead(html), "Meta lead.");
    }

    #[test]
    fn test_social_meta_names_recognized() {
        let og = r#"<head><meta name="og:description" content="OG lead"></head><p>x</p>"#;
        assert_eq!(extract_lead(og), "OG lead");

        let twitter = r#"<head><meta name="twitter:description" content="Tweet lead"></head>"#;
        assert_eq!(extract_lead(twitter), "Tweet lead");
    }

    #[test]
    fn test_first_meta_in_document_order_wins() {
        let html = r#"<head>
            <meta name="twitter:description" content="First">
            <meta name="description" content="Second">
        </head>"#;
        assert_eq!(extract_lead(html), "First");
    }

    #[test]
    fn test_paragraph_fallback() {
        let html = r#"
            <html><head><meta name="description" content=""><meta name="keywords" content="k"></head>
            <body><p>  First <b>bold</b> paragraph. </p><p>Second.</p></body></html>
        "#;
        assert_eq!(extract_lead(html), "First bold paragraph.");
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(extract_lead("<html><body><div>no text</div></body></html>"), "");
    }
}
