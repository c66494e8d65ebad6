//! Email delivery: builds the multipart digest message and submits it over
//! SMTP with lettre.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use tracing::debug;

use crate::config::SmtpConfig;
use crate::error::DeliveryError;
use crate::pipeline::types::Digest;

/// Port on which SMTP submission expects TLS from the first byte.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Submits a finished message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: Message) -> Result<(), DeliveryError>;
}

/// Authenticated SMTP submission.
///
/// A fresh connection is opened per send and dropped when the send returns,
/// on success and failure alike.
pub struct SmtpMailer {
    host: String,
    port: u16,
    credentials: Credentials,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            credentials: Credentials::new(
                config.username.clone(),
                config.password.expose_secret().to_string(),
            ),
        }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, DeliveryError> {
        let builder = if self.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
        }
        .map_err(|e| DeliveryError::Transport(format!("SMTP relay {}: {e}", self.host)))?;

        Ok(builder
            .port(self.port)
            .credentials(self.credentials.clone())
            .build())
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: Message) -> Result<(), DeliveryError> {
        let transport = self.transport()?;
        transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::SendFailed(e.to_string()))?;
        Ok(())
    }
}

/// Sends a digest to every configured recipient in one message.
pub struct Dispatcher {
    transport: Arc<dyn MailTransport>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn MailTransport>, from: Mailbox, to: Vec<Mailbox>) -> Self {
        Self {
            transport,
            from,
            to,
        }
    }

    pub fn from_config(config: &SmtpConfig) -> Self {
        Self::new(
            Arc::new(SmtpMailer::new(config)),
            config.from_address.clone(),
            config.recipients.clone(),
        )
    }

    pub fn recipient_count(&self) -> usize {
        self.to.len()
    }

    /// `multipart/alternative` with the plain part first and HTML last.
    pub fn build_message(&self, digest: &Digest) -> Result<Message, DeliveryError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(digest.subject.as_str());
        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }

        builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(digest.plain_text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(digest.html.clone()),
                    ),
            )
            .map_err(|e| DeliveryError::Build(e.to_string()))
    }

    pub async fn dispatch(&self, digest: &Digest) -> Result<(), DeliveryError> {
        let message = self.build_message(digest)?;
        self.transport.send(message).await?;
        debug!(recipients = self.to.len(), "Message submitted");
        Ok(())
    }
}
