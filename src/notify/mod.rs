//! Outbound notifications (email).

pub mod smtp;

use anyhow::Result;
use async_trait::async_trait;

pub use smtp::SmtpNotifier;

/// A single outgoing email with an HTML body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: Email) -> Result<()>;
}

/// Used when no SMTP server is configured: records that a message would have
/// been sent without writing its body (which may carry a reset token).
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, email: Email) -> Result<()> {
        tracing::warn!(
            to = %email.to,
            subject = %email.subject,
            "SMTP not configured, email dropped"
        );
        Ok(())
    }
}
