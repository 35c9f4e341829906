use crate::config::mail::{MailConfig, TransportSecurity};
use crate::domain::model::OutboundMessage;
use crate::domain::ports::{MailCredentials, MailRelay, MailSession};
use crate::utils::error::{PortfolioError, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

/// 透過 SMTP 連到固定的郵件中繼
#[derive(Debug, Clone)]
pub struct SmtpRelay {
    host: String,
    port: u16,
    security: TransportSecurity,
    timeout: Duration,
}

impl SmtpRelay {
    pub fn from_config(config: &MailConfig) -> Self {
        Self {
            host: config.relay_host.clone(),
            port: config.relay_port,
            security: config.security,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

#[async_trait]
impl MailRelay for SmtpRelay {
    async fn connect(&self, credentials: &MailCredentials) -> Result<Box<dyn MailSession>> {
        let builder = match self.security {
            TransportSecurity::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
                    .map_err(mail_error)?
            }
            TransportSecurity::Tls => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host).map_err(mail_error)?
            }
            TransportSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
            }
        };

        let transport = builder
            .port(self.port)
            .timeout(Some(self.timeout))
            .credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ))
            .build();

        tracing::debug!(
            "Opened SMTP transport to {}:{} ({:?}) as {}",
            self.host,
            self.port,
            self.security,
            credentials.username
        );
        Ok(Box::new(SmtpSession { transport }))
    }
}

struct SmtpSession {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

#[async_trait]
impl MailSession for SmtpSession {
    async fn verify(&self) -> Result<()> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(PortfolioError::MailError {
                message: "SMTP relay did not accept the connection".to_string(),
            }),
            Err(e) => Err(mail_error(e)),
        }
    }

    async fn send(&self, message: &OutboundMessage) -> Result<String> {
        let email = build_message(message)?;
        let response = self.transport.send(email).await.map_err(mail_error)?;
        tracing::debug!("SMTP relay responded with code {}", response.code());
        Ok(message.message_id.clone())
    }
}

fn build_message(message: &OutboundMessage) -> Result<Message> {
    let from = Mailbox::new(
        Some(message.from_name.clone()),
        parse_address(&message.from_address)?,
    );
    let to = Mailbox::new(None, parse_address(&message.to)?);
    let reply_to = Mailbox::new(None, parse_address(&message.reply_to)?);

    Message::builder()
        .message_id(Some(message.message_id.clone()))
        .from(from)
        .reply_to(reply_to)
        .to(to)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_HTML)
        .body(message.html_body.clone())
        .map_err(mail_error)
}

fn parse_address(value: &str) -> Result<Address> {
    value.parse::<Address>().map_err(mail_error)
}

fn mail_error<E: std::fmt::Display>(e: E) -> PortfolioError {
    PortfolioError::MailError {
        message: e.to_string(),
    }
}
