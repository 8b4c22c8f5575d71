use crate::config::toml_config::MailConfig;
use crate::domain::model::OutgoingMail;
use crate::domain::ports::MailTransport;
use crate::utils::error::{MailerError, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// STARTTLS relay with login. Built without connection pooling, so every
/// message runs in its own authenticated session.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailerError::TransportError {
                message: format!("cannot set up relay {}: {}", config.host, e),
            })?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout()))
            .build();

        tracing::debug!(
            "SMTP relay {}:{} (timeout {:?})",
            config.host,
            config.port,
            config.timeout()
        );
        Ok(Self { transport })
    }

    /// Checks that the relay accepts a connection and the login.
    pub async fn test_connection(&self) -> Result<bool> {
        self.transport
            .test_connection()
            .await
            .map_err(|e| MailerError::TransportError {
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let message = build_message(mail)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::TransportError {
                message: e.to_string(),
            })?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| MailerError::AddressError {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// Plain-text body plus the sheet as an opaque binary attachment.
pub fn build_message(mail: &OutgoingMail) -> Result<Message> {
    let octet_stream =
        ContentType::parse("application/octet-stream").map_err(|e| MailerError::MessageError {
            message: e.to_string(),
        })?;

    Message::builder()
        .from(parse_mailbox(&mail.from)?)
        .to(parse_mailbox(&mail.to)?)
        .subject(mail.subject.clone())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(mail.body.clone()))
                .singlepart(
                    Attachment::new(mail.attachment_name.clone())
                        .body(mail.attachment.clone(), octet_stream),
                ),
        )
        .map_err(|e| MailerError::MessageError {
            message: e.to_string(),
        })
}
