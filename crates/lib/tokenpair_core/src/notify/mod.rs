//! Anomaly notifications.
//!
//! Sent when a refresh credential is presented from a different network
//! origin than the one it was issued to.

pub mod smtp;

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// Notification delivery error.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct NotifyError(pub String);

/// A message addressed to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Warning sent when a refresh happens from `origin`.
    pub fn origin_changed(recipient: &str, origin: &str) -> Self {
        Self {
            recipient: recipient.to_string(),
            subject: "Security warning".to_string(),
            body: format!("Your session was renewed with a refresh token from address {origin}."),
        }
    }
}

/// Outbound notification transport.
#[async_trait]
pub trait AnomalyNotifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Emits notifications as `warn` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl AnomalyNotifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        warn!(
            recipient = %notification.recipient,
            subject = %notification.subject,
            "{}",
            notification.body
        );
        Ok(())
    }
}

/// Keeps every notification in memory; optionally fails each delivery.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose deliveries all fail (after being recorded).
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AnomalyNotifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification.clone());
        }
        if self.fail {
            return Err(NotifyError("delivery refused".into()));
        }
        Ok(())
    }
}
