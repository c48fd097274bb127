//! # Dedup Notifier
//!
//! Email delivery with content-addressed deduplication.
//!
//! The [`DedupNotifier`] owns the process-lifetime set of fingerprints that
//! have already been mailed. A fingerprint is recorded only after the
//! transport reports success, so a transient mail failure never suppresses
//! a later legitimate notification.

use std::collections::HashSet;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;
use vaxwatch_common::config::MailConfig;

use crate::message::Fingerprint;

pub const SUBJECT: &str = "Vaccine Availability Notification";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mail configuration error: {0}")]
    Config(String),

    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

/// The authenticated mail-submission channel.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Sends plain-text mail over an implicit-TLS SMTP relay via `lettre`.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpMailer {
    /// Builds a mailer from the credentials file contents and the
    /// recipient list. Addresses were shape-checked at the CLI, but the
    /// stricter mailbox parse can still reject them here.
    pub fn from_config(config: &MailConfig, recipients: &[String]) -> Result<Self, NotifyError> {
        if recipients.is_empty() {
            return Err(NotifyError::Config(
                "at least one recipient is required".to_string(),
            ));
        }

        let from: Mailbox = config
            .sender_email
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Config(e.to_string()))?;

        let to: Vec<Mailbox> = recipients
            .iter()
            .map(|addr| {
                addr.parse()
                    .map_err(|e: lettre::address::AddressError| NotifyError::Config(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_url)
            .map_err(|e| NotifyError::Config(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.sender_email.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let mut builder = Message::builder().from(self.from.clone());
        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }

        let email: Message = builder
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        info!(recipients = self.to.len(), "notification email delivered");
        Ok(())
    }
}

/// Decides, per fingerprint, whether a message still needs to go out.
pub struct DedupNotifier {
    transport: Option<Box<dyn MailTransport>>,
    sent: HashSet<Fingerprint>,
}

impl DedupNotifier {
    /// Without a transport the notifier only tracks fingerprints; nothing
    /// is ever sent.
    pub fn new(transport: Option<Box<dyn MailTransport>>) -> Self {
        Self {
            transport,
            sent: HashSet::new(),
        }
    }

    pub fn already_sent(&self, fingerprint: &Fingerprint) -> bool {
        self.sent.contains(fingerprint)
    }

    /// Sends `body` unless this fingerprint was already mailed in this
    /// process lifetime. Returns whether a send occurred. A delivery
    /// error propagates and leaves the sent-set unchanged.
    pub async fn notify_if_new(
        &mut self,
        fingerprint: &Fingerprint,
        body: &str,
    ) -> Result<bool, NotifyError> {
        let Some(transport) = &self.transport else {
            return Ok(false);
        };
        if self.sent.contains(fingerprint) {
            return Ok(false);
        }

        transport.send(SUBJECT, body).await?;
        self.sent.insert(fingerprint.clone());
        Ok(true)
    }
}
