//! HTML digest rendering.
//!
//! Articles are grouped by category (categories sorted by name, articles kept
//! in the order they were scraped) and rendered as one self-contained,
//! inline-styled document suitable for an HTML mail body.

use crate::models::ArticleRecord;
use crate::utils::escape_html;
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Articles grouped for rendering, plus the time the digest was generated.
#[derive(Debug)]
pub struct DigestDocument<'a> {
    pub generated_at: DateTime<Local>,
    pub categories: BTreeMap<&'a str, Vec<&'a ArticleRecord>>,
}

impl<'a> DigestDocument<'a> {
    /// Group `articles` by category, preserving their relative order.
    pub fn new(articles: &'a [ArticleRecord], generated_at: DateTime<Local>) -> Self {
        let mut categories: BTreeMap<&str, Vec<&ArticleRecord>> = BTreeMap::new();
        for article in articles {
            categories
                .entry(article.category.as_str())
                .or_default()
                .push(article);
        }
        Self {
            generated_at,
            categories,
        }
    }

    /// Mail subject line for this digest.
    pub fn subject(&self) -> String {
        format!("Tech News Summary - {}", self.generated_at.format("%Y-%m-%d %H:%M"))
    }

    /// Render the complete HTML document.
    pub fn render(&self) -> String {
        let mut body = String::new();

        body.push_str(
            r#"<html>
<body style="font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; background-color: #f5f5f5;">
<div style="background-color: white; padding: 20px; border-radius: 10px; box-shadow: 0 2px 5px rgba(0,0,0,0.1);">
    <h1 style="color: #2c3e50; border-bottom: 2px solid #3498db; padding-bottom: 10px; text-align: center;">
        🌐 Today's Tech News Roundup
    </h1>
    <p style="color: #666; text-align: center;">
        Curated tech news with AI-powered summaries
    </p>
"#,
        );

        for (category, articles) in &self.categories {
            let _ = write!(
                body,
                r#"
    <div style="margin-top: 30px;">
        <h2 style="color: #2c3e50; background-color: #f8f9fa; padding: 10px; border-radius: 5px;">
            📌 {}
        </h2>
"#,
                escape_html(category)
            );
            for article in articles {
                render_article(&mut body, article);
            }
            body.push_str("    </div>\n");
        }

        let _ = write!(
            body,
            r#"
    <div style="margin-top: 30px; border-top: 1px solid #ddd; padding-top: 20px; text-align: center; color: #666;">
        <p>Generated by Tech News Digest on {}</p>
        <p style="font-size: 0.9em;">To unsubscribe, reply to this email with "unsubscribe" in the subject.</p>
    </div>
</div>
</body>
</html>
"#,
            self.generated_at.format("%Y-%m-%d at %H:%M")
        );

        body
    }
}

fn render_article(body: &mut String, article: &ArticleRecord) {
    let _ = write!(
        body,
        r#"
        <div style="margin: 20px 0; padding: 15px; border-left: 4px solid #3498db; background-color: #f8f9fa; border-radius: 5px;">
            <div style="display: flex; justify-content: space-between; align-items: center;">
                <h3 style="margin: 0; flex: 1;">
                    <a href="{link}" style="color: #3498db; text-decoration: none;">{title}</a>
                </h3>
                <span style="color: #666; font-size: 0.9em; margin-left: 10px;">{source}</span>
            </div>
            <div style="margin-top: 10px; padding: 10px; background-color: #fff; border-radius: 5px;">
                <p style="color: #2c3e50; margin: 0; font-weight: bold;">🤖 AI Summary:</p>
                <p style="color: #666; margin: 5px 0 0 0; line-height: 1.4;">{summary}</p>
            </div>
            <p style="color: #666; margin-top: 10px; line-height: 1.6;">{lead}</p>
        </div>
"#,
        link = escape_html(&article.link),
        title = escape_html(&article.title),
        source = escape_html(&article.source),
        summary = escape_html(&article.ai_summary),
        lead = escape_html(&article.lead_text),
    );
}
