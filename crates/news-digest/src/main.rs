use anyhow::{Context, Result};
use clap::Parser;
use shared::{
    ArticleStore, Config, GoogleNewsFetcher, Mailer, Notification, PageSummarizer, Pipeline,
    PipelineOptions,
};
use std::path::PathBuf;
use tracing_subscriber::{fmt as tfmt, EnvFilter};

/// Log filter used when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser)]
#[command(name = "news-digest")]
#[command(about = "Fetch news for a query, remember what was seen, and email a digest of new articles")]
struct Args {
    /// Search query for the news listing (defaults to NEWS_DIGEST_QUERY or "AI in automation")
    #[arg(short, long)]
    query: Option<String>,

    /// Maximum number of listing entries to consider
    #[arg(short, long, default_value = "10")]
    limit: usize,

    /// Path to the article database (defaults to NEWS_DIGEST_DB or ./scraper.db)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Don't attach the article database to the email
    #[arg(long)]
    no_attach: bool,

    /// Send a digest of sample articles to check mail delivery
    #[arg(long, conflicts_with = "list")]
    preview: bool,

    /// Print the most recently stored articles and exit
    #[arg(long, value_name = "COUNT", num_args = 0..=1, default_missing_value = "20")]
    list: Option<usize>,

    /// Print stored articles as JSON (with --list)
    #[arg(long, requires = "list")]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    if let Some(count) = args.list {
        Config::try_load_dotenv();
        let db_path = args.db.unwrap_or_else(Config::db_path_from_env);
        return list_articles(db_path, count, args.json);
    }

    // Mail settings are checked before any network or storage access
    let config = Config::from_env()?;
    let mailer = Mailer::new(&config.mail).context("Invalid email configuration")?;

    let mut options = PipelineOptions::new(args.db.unwrap_or(config.db_path));
    options.query = args.query.unwrap_or(config.query);
    options.limit = args.limit;
    options.attach_store = !args.no_attach;

    let pipeline = Pipeline::new(
        GoogleNewsFetcher::new()?,
        PageSummarizer::new()?,
        mailer,
        options,
    );

    if args.preview {
        println!("📧 Sending preview digest to {}...", config.mail.recipient);
        pipeline.send_preview().await?;
        println!("✅ Preview email sent.");
        return Ok(());
    }

    println!("📰 Fetching news for \"{}\"...", pipeline.options().query);
    let report = pipeline.run().await?;

    println!(
        "✓ Checked {} articles ({} already seen)",
        report.candidates, report.skipped
    );

    if report.new_articles.is_empty() {
        println!("No new articles found today.");
        return Ok(());
    }

    println!("✓ Stored {} new articles", report.new_articles.len());
    for article in &report.new_articles {
        println!("  • {}", article.title);
        println!("    {}", article.url);
    }
    if report.degraded > 0 {
        println!("⚠ {} articles could not be summarized", report.degraded);
    }

    match report.notification {
        Notification::Sent => println!("\n✅ Email sent successfully."),
        Notification::Failed(reason) => {
            eprintln!("\n⚠ Articles were saved, but the email could not be sent: {}", reason)
        }
        Notification::NotSent => {}
    }

    Ok(())
}

fn list_articles(db_path: PathBuf, count: usize, json: bool) -> Result<()> {
    if !db_path.exists() {
        println!("No article database at {}", db_path.display());
        return Ok(());
    }

    let store = ArticleStore::open_read_only(&db_path)?;
    let articles = store.list_recent(count)?;

    if json {
        let output =
            serde_json::to_string_pretty(&articles).context("Failed to serialize articles")?;
        println!("{}", output);
        return Ok(());
    }

    if articles.is_empty() {
        println!("No articles stored in {}", db_path.display());
        return Ok(());
    }

    println!(
        "{} of {} stored articles in {}:\n",
        articles.len(),
        store.count()?,
        db_path.display()
    );
    for stored in &articles {
        let article = &stored.article;
        println!("[{}] {} ({})", stored.id, article.title, article.published);
        println!("    {}", article.url);
        if !article.summary.is_empty() {
            println!("    {}", article.summary);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_default_log_filter_is_info() {
        let filter = EnvFilter::new(DEFAULT_LOG_FILTER);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_list_missing_database_creates_nothing() {
        let dir = std::env::temp_dir().join(format!("news-digest-list-{}", std::process::id()));
        let db_path = dir.join("scraper.db");

        list_articles(db_path.clone(), 20, false).unwrap();

        assert!(!db_path.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn test_list_flag_defaults_to_twenty() {
        let args = Args::try_parse_from(["news-digest", "--list"]).unwrap();
        assert_eq!(args.list, Some(20));
        assert!(!args.preview);
    }
}
