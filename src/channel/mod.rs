//! Outbound channel sender contracts.
//!
//! The wire-level transport (SMTP relay, SMS gateway) lives outside this
//! service; these traits are the seam the schedulers deliver through. The
//! `LogOnlySender` implementation records sends via tracing and always
//! succeeds, for development and local runs.

use async_trait::async_trait;
use thiserror::Error;

/// A delivery attempt that the provider did not accept.
///
/// Never surfaced to API callers: the scheduler folds it into the row's
/// per-channel fail count.
#[derive(Debug, Clone, Error)]
pub enum SendError {
    #[error("Provider rejected the message: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// A fully rendered email ready for handoff to the transport.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<String>,
}

/// Capability to deliver a rendered message to email addresses.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), SendError>;
}

/// Capability to deliver rendered text to phone numbers.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(
        &self,
        phone_numbers: &[String],
        message: &str,
        attachments: &[String],
    ) -> Result<(), SendError>;
}

/// Development sender: logs the outbound message and reports success.
pub struct LogOnlySender;

#[async_trait]
impl EmailSender for LogOnlySender {
    async fn send(&self, email: &OutboundEmail) -> Result<(), SendError> {
        tracing::info!(
            to = ?email.to,
            cc = ?email.cc,
            bcc = ?email.bcc,
            subject = %email.subject,
            body_len = email.body.len(),
            attachments = email.attachments.len(),
            "Outbound email (log-only sender)"
        );
        Ok(())
    }
}

#[async_trait]
impl SmsSender for LogOnlySender {
    async fn send(
        &self,
        phone_numbers: &[String],
        message: &str,
        attachments: &[String],
    ) -> Result<(), SendError> {
        tracing::info!(
            phone_numbers = ?phone_numbers,
            message_len = message.len(),
            attachments = attachments.len(),
            "Outbound SMS (log-only sender)"
        );
        Ok(())
    }
}
