use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;
use tracing::{info, instrument};

use crate::config::MailSettings;
use crate::digest::{DigestRenderer, DEFAULT_HEADING};
use crate::models::Article;
use crate::pipeline::DigestSender;

/// Sends the digest over implicit-TLS SMTP.
pub struct Mailer {
    from: Mailbox,
    to: Mailbox,
    heading: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl Mailer {
    /// Validate the settings and prepare the transport. Nothing touches the
    /// network until [`Mailer::notify`] is called.
    pub fn new(settings: &MailSettings) -> Result<Self> {
        if settings.sender.trim().is_empty()
            || settings.recipient.trim().is_empty()
            || settings.password.is_empty()
        {
            anyhow::bail!("Missing required email settings (sender, recipient, password)");
        }

        let from: Mailbox = settings
            .sender
            .parse()
            .with_context(|| format!("Invalid sender address: {}", settings.sender))?;
        let to: Mailbox = settings
            .recipient
            .parse()
            .with_context(|| format!("Invalid recipient address: {}", settings.recipient))?;

        let credentials = Credentials::new(settings.sender.clone(), settings.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
            .with_context(|| format!("Invalid SMTP host: {}", settings.smtp_host))?
            .port(settings.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            from,
            to,
            heading: DEFAULT_HEADING.to_string(),
            transport,
        })
    }

    /// Render `articles` and assemble the message. The attachment is skipped
    /// when the path does not exist.
    pub fn build_message(
        &self,
        subject: &str,
        articles: &[Article],
        attachment: Option<&Path>,
    ) -> Result<Message> {
        let html = DigestRenderer::generate_html(articles, &self.heading);
        let text = DigestRenderer::generate_text(articles, &self.heading);
        let body = MultiPart::alternative_plain_html(text, html);

        let builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject);

        let message = match attachment.filter(|path| path.exists()) {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read attachment: {}", path.display()))?;
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "attachment.bin".to_string());
                let content_type = ContentType::parse("application/octet-stream")
                    .context("Invalid attachment content type")?;

                builder.multipart(
                    MultiPart::mixed()
                        .multipart(body)
                        .singlepart(Attachment::new(filename).body(bytes, content_type)),
                )
            }
            None => builder.multipart(body),
        };

        message.context("Failed to build digest email")
    }

    #[instrument(level = "info", skip(self, articles), fields(count = articles.len()))]
    pub async fn notify(
        &self,
        subject: &str,
        articles: &[Article],
        attachment: Option<&Path>,
    ) -> Result<()> {
        let message = self.build_message(subject, articles, attachment)?;

        self.transport
            .send(message)
            .await
            .context("Failed to deliver digest email")?;

        info!(to = %self.to, "digest email sent");
        Ok(())
    }
}

#[async_trait]
impl DigestSender for Mailer {
    async fn send_digest(
        &self,
        subject: &str,
        articles: &[Article],
        attachment: Option<&Path>,
    ) -> Result<()> {
        self.notify(subject, articles, attachment).await
    }
}
