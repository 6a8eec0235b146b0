// Public modules
pub mod config;
pub mod digest;
pub mod fetcher;
pub mod models;
pub mod notifier;
pub mod pipeline;
pub mod store;
pub mod summarizer;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{Config, MailSettings};
pub use digest::DigestRenderer;
pub use fetcher::GoogleNewsFetcher;
pub use models::{Article, Candidate, StoredArticle};
pub use notifier::Mailer;
pub use pipeline::{
    ArticleSummarizer, CandidateSource, DigestSender, Notification, Pipeline, PipelineOptions,
    RunReport,
};
pub use store::ArticleStore;
pub use summarizer::{PageSummarizer, Summary};
