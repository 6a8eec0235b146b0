use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};

use crate::models::Candidate;
use crate::pipeline::CandidateSource;

pub const GOOGLE_NEWS_HOST: &str = "https://news.google.com";
pub const GOOGLE_SOURCE: &str = "google";

/// Headline links inside result cards on the search page
const HEADLINE_SELECTOR: &str = "article h3 a";

/// Pulls candidate articles off the Google News search page.
pub struct GoogleNewsFetcher {
    client: Client,
    host: String,
}

impl GoogleNewsFetcher {
    pub fn new() -> Result<Self> {
        Self::with_host(GOOGLE_NEWS_HOST)
    }

    /// Point the fetcher at another host serving the same page layout.
    pub fn with_host(host: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            host: host.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?q={}&hl=en-US&gl=US&ceid=US:en",
            self.host,
            urlencoding::encode(query)
        )
    }

    /// Fetch the listing page for `query` and return up to `limit` candidates
    /// in page order. There is no retry; any network or HTTP error is returned.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_candidates(&self, query: &str, limit: usize) -> Result<Vec<Candidate>> {
        let url = self.search_url(query);
        debug!(%url, "fetching listing page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch news listing")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("News listing returned HTTP error: {}", status);
        }

        let html = response
            .text()
            .await
            .context("Failed to read news listing body")?;

        let candidates = extract_candidates(&html, &self.host, limit)?;
        info!(count = candidates.len(), "extracted candidates");
        Ok(candidates)
    }
}

#[async_trait]
impl CandidateSource for GoogleNewsFetcher {
    fn source(&self) -> &str {
        GOOGLE_SOURCE
    }

    async fn fetch_candidates(&self, query: &str, limit: usize) -> Result<Vec<Candidate>> {
        GoogleNewsFetcher::fetch_candidates(self, query, limit).await
    }
}

/// Extract headline links from a listing page, in document order.
pub fn extract_candidates(html: &str, host: &str, limit: usize) -> Result<Vec<Candidate>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(HEADLINE_SELECTOR)
        .map_err(|e| anyhow::anyhow!("Invalid headline selector: {:?}", e))?;

    let candidates = document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let title = anchor.text().collect::<String>().trim().to_string();
            Some(Candidate::new(title, resolve_link(href, host)))
        })
        .take(limit)
        .collect();

    Ok(candidates)
}

/// Rewrite same-site `./` links onto `host`; everything else is left as is.
pub fn resolve_link(href: &str, host: &str) -> String {
    match href.strip_prefix('.') {
        Some(rest) if rest.starts_with('/') => format!("{}{}", host.trim_end_matches('/'), rest),
        _ => href.to_string(),
    }
}
