use crate::domain::ports::Notifier;
use crate::utils::error::{Result, WatchError};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

pub const DEFAULT_MAIL_FROM: &str = "hncheck@mutelight.org";

#[derive(Clone)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub login: String,
    pub password: String,
    pub from: String,
    pub recipient: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("login", &self.login)
            .field("password", &"***")
            .field("from", &self.from)
            .field("recipient", &self.recipient)
            .finish()
    }
}

pub fn parse_mailbox(field_name: &str, value: &str) -> Result<Mailbox> {
    value
        .parse()
        .map_err(|e: lettre::address::AddressError| WatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Invalid email address: {}", e),
        })
}

pub fn build_message(from: &Mailbox, to: &Mailbox, subject: &str, body: &str) -> Result<Message> {
    Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(subject)
        .body(body.to_string())
        .map_err(|e| WatchError::NotifyError {
            message: format!("could not build message: {}", e),
        })
}

/// Sends alerts to a single recipient over an authenticated STARTTLS relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    pub fn new(settings: SmtpSettings) -> Result<Self> {
        let from = parse_mailbox("MAIL_FROM", &settings.from)?;
        let to = parse_mailbox("RECIPIENT", &settings.recipient)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)
            .map_err(|e| WatchError::InvalidConfigValueError {
                field: "SMTP_SERVER".to_string(),
                value: settings.server.clone(),
                reason: e.to_string(),
            })?
            .port(settings.port)
            .credentials(Credentials::new(settings.login, settings.password))
            .build();

        Ok(Self { transport, from, to })
    }

    pub fn recipient(&self) -> &Mailbox {
        &self.to
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        let message = build_message(&self.from, &self.to, subject, body)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| WatchError::NotifyError {
                message: e.to_string(),
            })?;

        tracing::info!("📧 Alert sent to {}: {}", self.to, subject);
        Ok(())
    }
}
