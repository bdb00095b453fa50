//! Email delivery over SMTP with implicit TLS.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use super::{AnomalyNotifier, Notification, NotifyError};

/// SMTPS port.
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Relay and sender account.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// `From` address of every warning.
    pub sender: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

/// Sends notifications as plain-text email through an authenticated relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpNotifier {
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotifyError> {
        let sender = parse_mailbox(&settings.sender)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| NotifyError(format!("smtp relay {}: {e}", settings.host)))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ))
            .build();
        Ok(Self { transport, sender })
    }
}

#[async_trait]
impl AnomalyNotifier for SmtpNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let email = message(&self.sender, notification)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError(format!("smtp send: {e}")))?;
        info!(recipient = %notification.recipient, "anomaly notification sent");
        Ok(())
    }
}

/// Build the email for `notification`.
pub fn message(sender: &Mailbox, notification: &Notification) -> Result<Message, NotifyError> {
    Message::builder()
        .from(sender.clone())
        .to(parse_mailbox(&notification.recipient)?)
        .subject(notification.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(notification.body.clone())
        .map_err(|e| NotifyError(format!("build message: {e}")))
}

fn parse_mailbox(raw: &str) -> Result<Mailbox, NotifyError> {
    raw.parse()
        .map_err(|e| NotifyError(format!("invalid address '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> Mailbox {
        "tokenpair@example.com".parse().unwrap()
    }

    #[test]
    fn message_carries_headers_and_body() {
        let n = Notification::origin_changed("a@example.com", "10.0.0.2");
        let raw = String::from_utf8(message(&sender(), &n).unwrap().formatted()).unwrap();
        assert!(raw.contains("From: tokenpair@example.com"));
        assert!(raw.contains("To: a@example.com"));
        assert!(raw.contains("Subject: Security warning"));
        assert!(raw.contains("from address 10.0.0.2."));
    }

    #[test]
    fn invalid_recipient_is_rejected() {
        let n = Notification::origin_changed("not an address", "10.0.0.2");
        assert!(message(&sender(), &n).is_err());
    }

    #[test]
    fn invalid_sender_is_rejected() {
        let settings = SmtpSettings {
            host: "smtp.example.com".into(),
            port: DEFAULT_SMTP_PORT,
            user: "u".into(),
            password: "p".into(),
            sender: "nobody".into(),
        };
        assert!(SmtpNotifier::new(&settings).is_err());
    }

    #[test]
    fn debug_hides_password() {
        let settings = SmtpSettings {
            host: "smtp.example.com".into(),
            port: DEFAULT_SMTP_PORT,
            user: "u".into(),
            password: "hunter2".into(),
            sender: "tokenpair@example.com".into(),
        };
        assert!(!format!("{settings:?}").contains("hunter2"));
    }
}
