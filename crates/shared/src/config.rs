use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_QUERY: &str = "AI in automation";
pub const DEFAULT_DB_PATH: &str = "scraper.db";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

const MISSING_HELP: &str = "To fix this, create ~/.config/news-digest/.env (or ./.env) with:\n  \
    SENDER_EMAIL=you@example.com\n  \
    RECIPIENT_EMAIL=digest@example.com\n  \
    EMAIL_PASSWORD=your_app_password";

/// Delivery settings for the digest mail.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub sender: String,
    pub recipient: String,
    pub password: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl MailSettings {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            password: password.into(),
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
        }
    }

    pub fn from_env() -> Result<Self> {
        let sender = required_var("SENDER_EMAIL")?;
        let recipient = required_var("RECIPIENT_EMAIL")?;
        let password = required_var("EMAIL_PASSWORD")?;

        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| DEFAULT_SMTP_HOST.to_string());
        let smtp_port = match env::var("SMTP_PORT") {
            Ok(port) => port
                .parse()
                .with_context(|| format!("SMTP_PORT is not a valid port: {}", port))?,
            Err(_) => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            sender,
            recipient,
            password,
            smtp_host,
            smtp_port,
        })
    }
}

/// Settings resolved once at startup and handed to the pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub mail: MailSettings,
    pub db_path: PathBuf,
    pub query: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::try_load_dotenv();

        let mail = MailSettings::from_env()?;

        Ok(Self {
            mail,
            db_path: Self::db_path_from_env(),
            query: Self::query_from_env(),
        })
    }

    pub fn db_path_from_env() -> PathBuf {
        env::var("NEWS_DIGEST_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH))
    }

    pub fn query_from_env() -> String {
        env::var("NEWS_DIGEST_QUERY").unwrap_or_else(|_| DEFAULT_QUERY.to_string())
    }

    pub fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            tracing::debug!("loaded .env from current directory");
            return;
        }

        // 2. ~/.config/news-digest/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("news-digest").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                tracing::debug!(path = %config_path.display(), "loaded .env");
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() && dotenvy::from_path(&home_path).is_ok() {
                tracing::debug!(path = %home_path.display(), "loaded .env");
                return;
            }
        }

        tracing::debug!("no .env file found, using process environment");
    }
}

fn required_var(name: &str) -> Result<String> {
    let value = env::var(name).with_context(|| format!("{} not found.\n\n{}", name, MISSING_HELP))?;
    if value.trim().is_empty() {
        anyhow::bail!("{} is set but empty.\n\n{}", name, MISSING_HELP);
    }
    Ok(value)
}
