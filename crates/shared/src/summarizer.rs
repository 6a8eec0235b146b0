use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::pipeline::ArticleSummarizer;

pub const DEFAULT_MAX_SENTENCES: usize = 2;

/// Excerpts this short are treated as no summary at all.
const MIN_SUMMARY_LEN: usize = 10;

const NO_SUMMARY: &str = "(No summary available)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Excerpt(String),
    Insufficient,
    Failed(String),
}

impl Summary {
    /// Text stored with the article and shown in the digest. Never empty.
    pub fn text(&self) -> String {
        match self {
            Summary::Excerpt(text) => text.clone(),
            Summary::Insufficient => NO_SUMMARY.to_string(),
            Summary::Failed(reason) => format!("(Could not summarize: {})", reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self, Summary::Excerpt(_))
    }
}

/// Builds a short lead-in from the paragraphs of an article page.
pub struct PageSummarizer {
    client: Client,
}

impl PageSummarizer {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(5))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Summarize the page at `url`. Failures are folded into [`Summary::Failed`].
    #[instrument(level = "debug", skip(self))]
    pub async fn summarize(&self, url: &str, max_sentences: usize) -> Summary {
        match self.fetch_page(url).await {
            Ok(html) => {
                let summary = excerpt(&html, max_sentences);
                debug!(degraded = summary.is_degraded(), "summarized article");
                summary
            }
            Err(e) => {
                warn!(%url, error = %e, "could not summarize article");
                Summary::Failed(format!("{:#}", e))
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error: {}", status);
        }

        response.text().await.context("failed to read body")
    }
}

#[async_trait]
impl ArticleSummarizer for PageSummarizer {
    async fn summarize(&self, url: &str, max_sentences: usize) -> Summary {
        PageSummarizer::summarize(self, url, max_sentences).await
    }
}

/// Join the text of every `<p>` and keep the first `max_sentences` sentences.
pub fn excerpt(html: &str, max_sentences: usize) -> Summary {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("p") {
        Ok(selector) => selector,
        Err(e) => return Summary::Failed(format!("invalid selector: {:?}", e)),
    };

    let paragraphs: Vec<String> = document
        .select(&selector)
        .map(|p| p.text().collect::<String>())
        .collect();
    let text = paragraphs.join(" ");
    let text = text.trim();

    let sentences: Vec<&str> = text.split(". ").take(max_sentences).collect();
    let summary = format!("{}.", sentences.join(". "));

    if summary.chars().count() > MIN_SUMMARY_LEN {
        Summary::Excerpt(summary)
    } else {
        Summary::Insufficient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_html;

    #[test]
    fn test_excerpt_takes_first_sentences() {
        let html = r#"
            <html><body>
              <h1>Headline</h1>
              <p>Robots are taking over the warehouse. Output doubled last year.</p>
              <p>Unions are negotiating. Nobody expected this.</p>
            </body></html>
        "#;

        assert_eq!(
            excerpt(html, 2),
            Summary::Excerpt(
                "Robots are taking over the warehouse. Output doubled last year.".to_string()
            )
        );
    }

    #[test]
    fn test_excerpt_joins_paragraphs_with_space() {
        let html = "<p>First paragraph without a stop</p><p>second one. Third sentence.</p>";
        assert_eq!(
            excerpt(html, 1),
            Summary::Excerpt("First paragraph without a stop second one.".to_string())
        );
    }

    #[test]
    fn test_excerpt_without_paragraphs_is_insufficient() {
        let summary = excerpt("<html><body><div>Only a div</div></body></html>", 2);
        assert_eq!(summary, Summary::Insufficient);
        assert_eq!(summary.text(), "(No summary available)");
    }

    #[test]
    fn test_excerpt_too_short_is_insufficient() {
        assert_eq!(excerpt("<p>Hi there</p>", 2), Summary::Insufficient);
    }

    #[test]
    fn test_failed_summary_text_embeds_reason() {
        let summary = Summary::Failed("timed out".to_string());
        assert!(summary.is_degraded());
        assert_eq!(summary.text(), "(Could not summarize: timed out)");
    }

    #[tokio::test]
    async fn test_summarize_unreachable_page_returns_placeholder() {
        let summarizer = PageSummarizer::with_timeout(Duration::from_secs(2)).unwrap();
        let summary = summarizer.summarize("http://127.0.0.1:1/article", 2).await;

        assert!(matches!(summary, Summary::Failed(_)));
        assert!(summary.text().starts_with("(Could not summarize: "));
    }

    #[tokio::test]
    async fn test_summarize_malformed_url_returns_placeholder() {
        let summarizer = PageSummarizer::new().unwrap();
        let summary = summarizer.summarize("not a url", 2).await;
        assert!(summary.is_degraded());
        assert!(!summary.text().is_empty());
    }

    #[tokio::test]
    async fn test_summarize_served_article() {
        let base = serve_html(
            "200 OK",
            "<html><body><p>Robots now pack most parcels. Output doubled. Unions object.</p></body></html>",
        )
        .await;
        let summarizer = PageSummarizer::new().unwrap();

        let summary = summarizer.summarize(&format!("{}/article", base), 2).await;

        assert_eq!(
            summary,
            Summary::Excerpt("Robots now pack most parcels. Output doubled.".to_string())
        );
    }

    #[tokio::test]
    async fn test_summarize_not_found_returns_failed() {
        let base = serve_html("404 Not Found", "<p>This page does not exist anymore.</p>").await;
        let summarizer = PageSummarizer::new().unwrap();

        let summary = summarizer.summarize(&format!("{}/missing", base), 2).await;

        assert!(matches!(summary, Summary::Failed(_)));
        assert!(summary.text().contains("HTTP error: 404"));
    }
}
