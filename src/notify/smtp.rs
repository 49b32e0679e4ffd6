use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

use super::{Email, Notifier};
use crate::config::SmtpConfig;

/// STARTTLS SMTP relay sender.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .with_context(|| format!("Invalid from address: {}", config.from))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .context("Failed to create SMTP transport")?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(10)))
            .build();

        Ok(Self { mailer, from })
    }
}

/// Build the MIME message for an [`Email`].
fn build_message(from: &Mailbox, email: Email) -> Result<Message> {
    let to: Mailbox = email
        .to
        .parse()
        .with_context(|| format!("Invalid to address: {}", email.to))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject)
        .header(ContentType::TEXT_HTML)
        .body(email.html_body)
        .context("Failed to create email")
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, email: Email) -> Result<()> {
        let recipient = email.to.clone();
        let message = build_message(&self.from, email)?;

        self.mailer
            .send(message)
            .await
            .context("Failed to send email")?;

        tracing::info!(to = %recipient, "Email sent");
        Ok(())
    }
}
