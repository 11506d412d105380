//! Email notifications for probe failures and monitor state changes

pub mod message;
pub mod mock;
pub mod smtp;

pub use mock::RecordingNotifier;
pub use smtp::SmtpNotifier;

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("unknown mail service '{0}'")]
    UnknownService(String),
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("mail transport error: {0}")]
    Transport(String),
    #[error("delivery timed out after {0:?}")]
    TimedOut(Duration),
}

/// Fixed set of addresses. Iteration and joining are sorted, so the
/// envelope is the same on every send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientList(BTreeSet<String>);

impl RecipientList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Comma-joined form used for the `To` header
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(",")
    }
}

impl<S: Into<String>> FromIterator<S> for RecipientList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for RecipientList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// One outgoing email, built fresh for every event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub subject: String,
    pub body: String,
    pub recipients: RecipientList,
}

impl NotificationRequest {
    pub fn new(subject: String, body: String, recipients: RecipientList) -> Self {
        Self {
            subject,
            body,
            recipients,
        }
    }

    /// HTML alternative of `body`
    pub fn html_body(&self) -> String {
        message::html_wrap(&self.body)
    }
}

/// Delivers a message to every recipient at once.
///
/// Implementations report failures; they never retry.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, request: &NotificationRequest) -> Result<(), DeliveryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipients_join_deterministically() {
        let a: RecipientList = ["b@example.com", "a@example.com", "c@example.com"]
            .into_iter()
            .collect();
        let b: RecipientList = ["c@example.com", "a@example.com", "b@example.com"]
            .into_iter()
            .collect();

        assert_eq!(a, b);
        assert_eq!(a.joined(), "a@example.com,b@example.com,c@example.com");
        assert_eq!(a.to_string(), a.joined());
    }

    #[test]
    fn test_recipients_deduplicate() {
        let list: RecipientList = ["ops@example.com", "ops@example.com"].into_iter().collect();
        assert_eq!(list.len(), 1);
        assert!(RecipientList::new().is_empty());
    }
}
