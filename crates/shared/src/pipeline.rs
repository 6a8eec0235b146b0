use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::config::DEFAULT_QUERY;
use crate::models::{Article, Candidate};
use crate::store::ArticleStore;
use crate::summarizer::{Summary, DEFAULT_MAX_SENTENCES};

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_SUBJECT: &str = "Today's AI Automation Digest";

/// Where candidates come from.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Label stored in the `source` column of every article this source yields.
    fn source(&self) -> &str;

    async fn fetch_candidates(&self, query: &str, limit: usize) -> Result<Vec<Candidate>>;
}

#[async_trait]
pub trait ArticleSummarizer: Send + Sync {
    /// Must not fail: problems are reported through [`Summary::Failed`].
    async fn summarize(&self, url: &str, max_sentences: usize) -> Summary;
}

#[async_trait]
pub trait DigestSender: Send + Sync {
    async fn send_digest(
        &self,
        subject: &str,
        articles: &[Article],
        attachment: Option<&Path>,
    ) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub query: String,
    pub limit: usize,
    pub max_sentences: usize,
    pub subject: String,
    pub db_path: PathBuf,
    /// Attach the database file to the digest email.
    pub attach_store: bool,
}

impl PipelineOptions {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            limit: DEFAULT_LIMIT,
            max_sentences: DEFAULT_MAX_SENTENCES,
            subject: DEFAULT_SUBJECT.to_string(),
            db_path: db_path.into(),
            attach_store: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Notification {
    #[default]
    NotSent,
    Sent,
    Failed(String),
}

/// Outcome of one pipeline run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub candidates: usize,
    pub skipped: usize,
    /// Summaries that fell back to a placeholder
    pub degraded: usize,
    /// Newly stored articles, in listing order
    pub new_articles: Vec<Article>,
    pub notification: Notification,
}

pub struct Pipeline<F, S, N> {
    fetcher: F,
    summarizer: S,
    notifier: N,
    options: PipelineOptions,
}

impl<F, S, N> Pipeline<F, S, N>
where
    F: CandidateSource,
    S: ArticleSummarizer,
    N: DigestSender,
{
    pub fn new(fetcher: F, summarizer: S, notifier: N, options: PipelineOptions) -> Self {
        Self {
            fetcher,
            summarizer,
            notifier,
            options,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Fetch, dedupe, summarize, store, then mail whatever was new.
    ///
    /// A failed listing fetch aborts before anything is written. A failed mail
    /// is recorded in the report; the stored articles stay stored.
    #[instrument(level = "info", skip(self), fields(query = %self.options.query))]
    pub async fn run(&self) -> Result<RunReport> {
        let store = ArticleStore::open(&self.options.db_path)?;

        let candidates = self
            .fetcher
            .fetch_candidates(&self.options.query, self.options.limit)
            .await
            .context("Failed to fetch news listing")?;

        let mut report = self.ingest(&store, candidates).await?;
        store.close()?;

        info!(
            candidates = report.candidates,
            new = report.new_articles.len(),
            skipped = report.skipped,
            degraded = report.degraded,
            "ingestion finished"
        );

        if report.new_articles.is_empty() {
            return Ok(report);
        }

        let attachment = self
            .options
            .attach_store
            .then(|| self.options.db_path.as_path());

        report.notification = match self
            .notifier
            .send_digest(&self.options.subject, &report.new_articles, attachment)
            .await
        {
            Ok(()) => Notification::Sent,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "digest notification failed");
                Notification::Failed(format!("{:#}", e))
            }
        };

        Ok(report)
    }

    async fn ingest(&self, store: &ArticleStore, candidates: Vec<Candidate>) -> Result<RunReport> {
        let published = Local::now().format("%Y-%m-%d").to_string();
        let mut report = RunReport {
            candidates: candidates.len(),
            ..RunReport::default()
        };

        for candidate in candidates {
            // Cheap pre-check so known articles are never re-summarized
            if store.contains(&candidate.url)? {
                report.skipped += 1;
                continue;
            }

            let summary = self
                .summarizer
                .summarize(&candidate.url, self.options.max_sentences)
                .await;
            if summary.is_degraded() {
                report.degraded += 1;
            }

            let article = Article::from_candidate(
                self.fetcher.source(),
                candidate,
                published.as_str(),
                summary.text(),
            );

            // The insert outcome is authoritative if another run got here first
            if store.insert_if_absent(&article)? {
                report.new_articles.push(article);
            } else {
                report.skipped += 1;
            }
        }

        Ok(report)
    }

    /// Send a digest of sample articles without touching the store.
    pub async fn send_preview(&self) -> Result<()> {
        let samples = vec![
            Article {
                source: "preview".to_string(),
                title: "Test: AI Automation Revolution".to_string(),
                url: "https://example.com".to_string(),
                published: String::new(),
                summary: "This is a simulated summary of how AI is changing automation."
                    .to_string(),
            },
            Article {
                source: "preview".to_string(),
                title: "Test: Machine Learning in Industry".to_string(),
                url: "https://example.com/ml".to_string(),
                published: String::new(),
                summary: "Machine learning is enhancing process efficiency across sectors."
                    .to_string(),
            },
        ];

        self.notifier
            .send_digest(&self.options.subject, &samples, None)
            .await
    }
}
